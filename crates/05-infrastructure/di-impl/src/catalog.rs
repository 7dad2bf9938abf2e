//! 基于候选目录的类型发现器

use async_trait::async_trait;
use di_abstractions::{DiscoveredComponent, DiscoveryCriteria, TypeDiscoverer};
use infrastructure_common::{catalog_candidates, Candidate, CandidateKind, ComponentResult};
use std::any::TypeId;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// 候选目录发现器
///
/// 候选来源为显式给定的列表，或进程级候选目录（`#[component(scan)]` 提交）。
/// 同一类型只处理第一次出现的候选。
#[derive(Debug, Clone, Default)]
pub struct CatalogDiscoverer {
    candidates: Option<Vec<Candidate>>,
}

impl CatalogDiscoverer {
    /// 使用进程级候选目录
    pub fn from_catalog() -> Self {
        Self { candidates: None }
    }

    /// 只使用给定的候选
    pub fn with_candidates<I: IntoIterator<Item = Candidate>>(candidates: I) -> Self {
        Self {
            candidates: Some(candidates.into_iter().collect()),
        }
    }

    /// 追加候选；从进程级目录发现时先复制目录内容
    pub fn add_candidate(mut self, candidate: Candidate) -> Self {
        self.candidates
            .get_or_insert_with(catalog_candidates)
            .push(candidate);
        self
    }

    fn candidates(&self) -> Vec<Candidate> {
        self.candidates.clone().unwrap_or_else(catalog_candidates)
    }

    /// 候选是否满足包、种类和角色标记条件
    fn matches(candidate: &Candidate, criteria: &DiscoveryCriteria) -> bool {
        if candidate.kind() != CandidateKind::Concrete {
            debug!(
                candidate = candidate.type_info().name.as_str(),
                kind = ?candidate.kind(),
                "排除非具体类型"
            );
            return false;
        }
        let in_packages = criteria.packages.is_empty()
            || criteria
                .packages
                .iter()
                .any(|p| candidate.type_info().in_package(p));
        if !in_packages {
            return false;
        }
        candidate
            .marker()
            .is_some_and(|marker| criteria.markers.contains(&marker))
    }
}

#[async_trait]
impl TypeDiscoverer for CatalogDiscoverer {
    fn name(&self) -> &str {
        "catalog"
    }

    async fn discover(
        &self,
        criteria: &DiscoveryCriteria,
    ) -> ComponentResult<Vec<DiscoveredComponent>> {
        let mut seen = HashSet::<TypeId>::new();
        let mut discovered = Vec::new();

        for candidate in self.candidates() {
            if !seen.insert(candidate.type_info().id) {
                continue;
            }
            if !Self::matches(&candidate, criteria) || !criteria.passes_filters(&candidate) {
                continue;
            }
            let Some(descriptor) = candidate.descriptor().cloned() else {
                continue;
            };

            match candidate.construct() {
                Ok(instance) => {
                    debug!(component = descriptor.identifier(), "发现组件");
                    discovered.push(DiscoveredComponent {
                        descriptor,
                        instance,
                    });
                }
                Err(e) => warn!(candidate = candidate.type_info().name.as_str(), "{}，候选已丢弃", e),
            }
        }

        info!(discoverer = self.name(), count = discovered.len(), "组件发现完成");
        Ok(discovered)
    }
}
