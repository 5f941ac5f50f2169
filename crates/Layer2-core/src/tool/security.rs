//! Tool Security - 경로 격리
//!
//! 모든 파일/프로세스 도구는 파일시스템에 접근하기 전에 `PathGuard`로
//! 요청 경로를 확인합니다.
//!
//! ## 검사
//! - 어휘적 정규화 (`.`, `..` 처리) 후 컴포넌트 단위 prefix 비교
//! - 심볼릭 링크 탈출 (존재하는 가장 가까운 조상을 canonicalize)

use std::path::{Path, PathBuf};
use tracing::debug;

/// 경로 해석 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// 정규화된 절대 경로
    pub target: PathBuf,

    /// 작업 루트 안에 있는지 여부
    pub contained: bool,
}

/// 작업 루트 경로 검증기
#[derive(Debug, Clone)]
pub struct PathGuard {
    root: PathBuf,
}

impl PathGuard {
    /// `root`는 canonical 절대 경로여야 합니다.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 요청 경로를 루트 기준으로 해석
    ///
    /// 비어 있거나 없는 경로는 루트 자신을 의미합니다.
    pub fn resolve(&self, requested: Option<&str>) -> ResolvedPath {
        let requested = requested.filter(|p| !p.is_empty()).unwrap_or(".");
        let target = normalize_path(&self.root.join(requested));
        let contained = self.contains(&target);

        if !contained {
            debug!(
                "Rejected path '{}' (resolved to {}) outside {}",
                requested,
                target.display(),
                self.root.display()
            );
        }

        ResolvedPath { target, contained }
    }

    /// 정규화된 절대 경로가 루트 안에 있는지 확인
    pub fn contains(&self, target: &Path) -> bool {
        target.starts_with(&self.root) && !self.escapes_via_symlink(target)
    }

    /// 존재하는 가장 가까운 조상의 실제 위치가 루트 밖인지 확인
    fn escapes_via_symlink(&self, target: &Path) -> bool {
        !resolves_within(target, &self.root)
    }
}

/// `target`의 실제 위치가 `base` 안에 있는지 확인
///
/// 존재하는 가장 가까운 조상을 canonicalize 합니다. `base`가 아직 없으면
/// 그 조상이 링크 없이 `base`의 상위 경로일 때만 허용합니다.
/// `base`는 canonical 경로 아래에 있어야 합니다.
pub fn resolves_within(target: &Path, base: &Path) -> bool {
    for ancestor in target.ancestors() {
        if ancestor.symlink_metadata().is_err() {
            continue;
        }
        return match ancestor.canonicalize() {
            Ok(real) => real.starts_with(base) || (real == ancestor && base.starts_with(&real)),
            // 깨진 링크
            Err(_) => false,
        };
    }
    false
}

/// 경로 정규화 (파일시스템 접근 없이)
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            std::path::Component::ParentDir => {
                // 루트에서는 pop이 아무것도 하지 않음
                normalized.pop();
            }
            std::path::Component::CurDir => {}
            other => normalized.push(other.as_os_str()),
        }
    }

    normalized
}
