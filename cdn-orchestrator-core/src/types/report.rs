//! 执行结果

use serde::Serialize;

/// 资源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    OriginRequestPolicy,
    ResponseHeadersPolicy,
    CachePolicy,
    Distribution,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::OriginRequestPolicy => "origin request policy",
            Self::ResponseHeadersPolicy => "response headers policy",
            Self::CachePolicy => "cache policy",
            Self::Distribution => "distribution",
        };
        f.write_str(s)
    }
}

/// 资源是复用还是新建
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    Reused,
    Created,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceOutcome {
    pub kind: ResourceKind,
    /// 策略为规范化后的名称，分发为源站域名
    pub name: String,
    pub id: String,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainReport {
    pub domain: String,
    pub resources: Vec<ResourceOutcome>,
}

impl DomainReport {
    pub fn resource(&self, kind: ResourceKind) -> Option<&ResourceOutcome> {
        self.resources.iter().find(|r| r.kind == kind)
    }
}

/// 一次完整执行的报告，按处理顺序排列
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub domains: Vec<DomainReport>,
}

impl ReconcileReport {
    /// 最后处理的域名
    pub fn last_domain(&self) -> Option<&str> {
        self.domains.last().map(|d| d.domain.as_str())
    }

    fn count(&self, outcome: Outcome) -> usize {
        self.domains
            .iter()
            .flat_map(|d| &d.resources)
            .filter(|r| r.outcome == outcome)
            .count()
    }

    pub fn created_count(&self) -> usize {
        self.count(Outcome::Created)
    }

    pub fn reused_count(&self) -> usize {
        self.count(Outcome::Reused)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(kind: ResourceKind, outcome: Outcome) -> ResourceOutcome {
        ResourceOutcome {
            kind,
            name: "n".to_string(),
            id: "id".to_string(),
            outcome,
        }
    }

    #[test]
    fn counts_and_last_domain() {
        let report = ReconcileReport {
            domains: vec![
                DomainReport {
                    domain: "lms.x".to_string(),
                    resources: vec![
                        outcome(ResourceKind::OriginRequestPolicy, Outcome::Created),
                        outcome(ResourceKind::Distribution, Outcome::Reused),
                    ],
                },
                DomainReport {
                    domain: "cms.x".to_string(),
                    resources: vec![outcome(ResourceKind::CachePolicy, Outcome::Created)],
                },
            ],
        };
        assert_eq!(report.last_domain(), Some("cms.x"));
        assert_eq!(report.created_count(), 2);
        assert_eq!(report.reused_count(), 1);
        assert!(report.domains[0].resource(ResourceKind::Distribution).is_some());
        assert!(report.domains[1].resource(ResourceKind::Distribution).is_none());
    }

    #[test]
    fn empty_report() {
        let report = ReconcileReport::default();
        assert_eq!(report.last_domain(), None);
        assert_eq!(report.created_count(), 0);
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(outcome(ResourceKind::CachePolicy, Outcome::Reused)).unwrap();
        assert_eq!(json["kind"], "cachePolicy");
        assert_eq!(json["outcome"], "reused");
    }
}
