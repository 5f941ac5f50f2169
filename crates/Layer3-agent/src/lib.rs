//! # sandcode-agent
//!
//! 모델과 샌드박스 도구 사이의 대화 루프입니다.
//!
//! ## 핵심 원칙
//!
//! 1. **Simple Loop** - 도구 호출이 없는 응답이 나올 때까지 반복
//! 2. **Sequential Tools** - 한 응답의 도구 호출은 순서대로 실행
//! 3. **Flat History** - 단순한 MessageHistory
//! 4. **Bounded** - `max_iterations` 안에 최종 응답이 없으면 종료
//!
//! ## 사용 예
//!
//! ```ignore
//! use sandcode_agent::{Agent, AgentContext, AgentEvent, MessageHistory};
//!
//! let ctx = Arc::new(AgentContext::new(provider, &sandbox));
//! let agent = Agent::new(ctx).with_max_iterations(20);
//!
//! let (tx, mut rx) = tokio::sync::mpsc::channel(100);
//! let outcome = agent.run(&mut MessageHistory::new(), "fix the bug", tx).await?;
//! ```

pub mod agent;
pub mod context;
pub mod history;

pub use agent::{Agent, AgentEvent, AgentOutcome};
pub use context::AgentContext;
pub use history::MessageHistory;
