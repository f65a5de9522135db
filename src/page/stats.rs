//! Shapes of the stats files produced by the log pipeline.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::histogram::Histogram;

/// `stats.{uri}.json`: breakdown for one URI.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UriStats {
    /// Query strings and fragments seen after the base URI.
    pub uri_rest_hist: Histogram,
    pub referer_hist: Histogram,
    pub ip_addr_hist: Histogram,
    pub user_agent_hist: Histogram,
    pub single: Map<String, Value>,
}

/// `stats.ALL.json`: site-wide breakdown.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteStats {
    pub blog_hist: Histogram,
    pub download_hist: Histogram,
    pub other_uri_hist: Histogram,
    pub referer_hist: Histogram,
    pub ip_addr_hist: Histogram,
    pub user_agent_hist: Histogram,
    pub single: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn uri_stats_requires_every_histogram() {
        let hist = json!({"top": {"value": [], "count": []}});
        let full = json!({
            "uriRestHist": hist, "refererHist": hist, "ipAddrHist": hist,
            "userAgentHist": hist, "single": {"hits": 1}
        });
        let stats: UriStats = serde_json::from_value(full).unwrap();
        assert_eq!(stats.single["hits"], 1);

        let partial = json!({"uriRestHist": hist, "single": {}});
        assert!(serde_json::from_value::<UriStats>(partial).is_err());
    }
}
