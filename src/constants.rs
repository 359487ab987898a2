// Portal URLs
pub const PORTAL_URL: &str = "https://www.portaldecompraspublicas.com.br";
pub const PROCESSES_PATH: &str = "/processos";

// Search query parameters
pub const QUERY_KEYWORD_PARAM: &str = "objeto";
pub const QUERY_REGION_PARAM: &str = "uf_ge";
pub const QUERY_STATUS_PARAM: &str = "codigoStatus";
/// Status code the portal uses for processes still open for proposals.
pub const OPEN_STATUS_CODE: &str = "1";

// Search results markup
pub const RESULT_ITEM_SELECTOR: &str = "div.item";
pub const EMPTY_RESULTS_SELECTOR: &str = "div.empty-list-container";
pub const DETAIL_LINK_SELECTOR: &str = "a.btn-default";
pub const TITLE_SELECTOR: &str = "h2";
pub const TITLE_OBJECT_SELECTOR: &str = "a";
pub const TITLE_NUMBER_SELECTOR: &str = "span";
pub const SPAN_SELECTOR: &str = "span";
pub const CALENDAR_ICON_SELECTOR: &str = "i.cp-calendario";
pub const LOCATION_ICON_SELECTOR: &str = "i.cp-pin-mapa";
/// Separator between organization and region in the location span.
pub const LOCATION_SEPARATOR: &str = " - ";

// Detail page markup
pub const COOKIE_BUTTON_SELECTOR: &str = "#btn-aceitar-cookie";
pub const DATE_SUMMARY_SELECTOR: &str = "div.datas-processo";
pub const DEADLINE_LABEL: &str = "Limite p/ Recebimento das Propostas:";
pub const ITEMS_SECTION_SELECTOR: &str = "#itens";
pub const ITEM_ROW_SELECTOR: &str = "#itens div.item-processo";
pub const ITEMS_EMPTY_SELECTOR: &str = "#itens div.empty-list-container";
pub const ITEM_QUANTITY_SELECTOR: &str = ".quantidade";
pub const ITEM_UNIT_VALUE_SELECTOR: &str = ".valor-referencia";
pub const NEXT_PAGE_SELECTOR: &str = "#itens .pagination a.next:not(.disabled)";
pub const LINE_BREAK_PATTERN: &str = r"(?i)<br\s*/?>";

// Record values
pub const OPEN_STATUS: &str = "Aberto";
pub const NOT_FOUND: &str = "Não encontrado";
pub const NOT_AVAILABLE: &str = "N/A";
pub const FOUND_DATE_FORMAT: &str = "%d/%m/%Y";

// Ledger header labels used by the normalization pass
pub const OBJECT_HEADER: &str = "Objeto da Licitação";
pub const ORGANIZATION_HEADER: &str = "Órgão Licitante";
/// 1-based column holding the portal link.
pub const LINK_COLUMN: u32 = 8;

// Browser session
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36";
