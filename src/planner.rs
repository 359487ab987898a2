use crate::models::SearchQuery;

/// Enumerates every (keyword, region) pair exactly once, keyword-major.
///
/// Blank entries are ignored and surrounding whitespace is trimmed.
///
/// # Arguments
///
/// * `keywords` - Search terms sent to the portal, in priority order
/// * `regions` - Region codes (UF) searched for each keyword
///
/// # Returns
///
/// `keywords.len() * regions.len()` queries (after dropping blanks). With
/// `["vigilancia", "cftv"]` and `["SP", "RJ"]` the order is vigilancia/SP,
/// vigilancia/RJ, cftv/SP, cftv/RJ.
///
/// # Example
///
/// ```
/// use pcp_cli::planner::plan_queries;
///
/// let plan = plan_queries(&["cftv".to_string()], &["SP".to_string(), "MG".to_string()]);
/// assert_eq!(plan.len(), 2);
/// assert_eq!(plan[1].region, "MG");
/// ```
pub fn plan_queries(keywords: &[String], regions: &[String]) -> Vec<SearchQuery> {
    let regions: Vec<&str> = regions
        .iter()
        .map(|r| r.trim())
        .filter(|r| !r.is_empty())
        .collect();

    keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .flat_map(|keyword| {
            regions.iter().map(move |region| SearchQuery {
                keyword: keyword.to_string(),
                region: region.to_string(),
            })
        })
        .collect()
}
