//! 数据加载周期
//!
//! 页面挂载时发出一次读请求，状态按转换表推进：
//! idle → loading → loaded | empty | failed。请求失败一律进入错误状态，
//! 不使用本地占位数据。

use crate::scope::RequestScope;
use hms_core::{HmsError, Listing, Result};
use std::collections::HashMap;
use std::future::Future;
use tracing::{debug, warn};

/// 加载阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchPhase {
    Idle,
    Loading,
    Loaded,
    Empty,
    Failed,
}

/// 加载事件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchEvent {
    Start,
    Resolve,
    ResolveEmpty,
    Reject,
}

/// 加载状态转换表
#[derive(Debug)]
pub struct FetchTransitions {
    transitions: HashMap<(FetchPhase, FetchEvent), FetchPhase>,
}

impl FetchTransitions {
    pub fn new() -> Self {
        let mut transitions = HashMap::new();

        transitions.insert((FetchPhase::Idle, FetchEvent::Start), FetchPhase::Loading);
        transitions.insert((FetchPhase::Loading, FetchEvent::Resolve), FetchPhase::Loaded);
        transitions.insert((FetchPhase::Loading, FetchEvent::ResolveEmpty), FetchPhase::Empty);
        transitions.insert((FetchPhase::Loading, FetchEvent::Reject), FetchPhase::Failed);
        // 登录检查在请求之前失败
        transitions.insert((FetchPhase::Idle, FetchEvent::Reject), FetchPhase::Failed);
        // 依赖变化后重新加载
        transitions.insert((FetchPhase::Loaded, FetchEvent::Start), FetchPhase::Loading);
        transitions.insert((FetchPhase::Empty, FetchEvent::Start), FetchPhase::Loading);
        transitions.insert((FetchPhase::Failed, FetchEvent::Start), FetchPhase::Loading);

        Self { transitions }
    }

    pub fn can_transition(&self, from: FetchPhase, event: FetchEvent) -> bool {
        self.transitions.contains_key(&(from, event))
    }

    pub fn transition(&self, from: FetchPhase, event: FetchEvent) -> Result<FetchPhase> {
        match self.transitions.get(&(from, event)) {
            Some(to) => Ok(*to),
            None => Err(HmsError::InvalidStateTransition {
                from: format!("{:?}", from),
                event: format!("{:?}", event),
            }),
        }
    }
}

impl Default for FetchTransitions {
    fn default() -> Self {
        Self::new()
    }
}

/// 加载状态及其数据
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    Idle,
    Loading,
    Loaded(T),
    Empty,
    Failed(String),
}

impl<T> FetchState<T> {
    pub fn phase(&self) -> FetchPhase {
        match self {
            FetchState::Idle => FetchPhase::Idle,
            FetchState::Loading => FetchPhase::Loading,
            FetchState::Loaded(_) => FetchPhase::Loaded,
            FetchState::Empty => FetchPhase::Empty,
            FetchState::Failed(_) => FetchPhase::Failed,
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            FetchState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// 单个读请求的加载周期
#[derive(Debug)]
pub struct FetchCycle<T> {
    what: &'static str,
    state: FetchState<T>,
    transitions: FetchTransitions,
}

impl<T> FetchCycle<T> {
    pub fn new(what: &'static str) -> Self {
        Self {
            what,
            state: FetchState::Idle,
            transitions: FetchTransitions::new(),
        }
    }

    pub fn state(&self) -> &FetchState<T> {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut FetchState<T> {
        &mut self.state
    }

    pub fn start(&mut self) -> Result<()> {
        self.apply(FetchEvent::Start, FetchState::Loading)
    }

    pub fn resolve(&mut self, data: T) -> Result<()> {
        self.apply(FetchEvent::Resolve, FetchState::Loaded(data))
    }

    pub fn resolve_empty(&mut self) -> Result<()> {
        self.apply(FetchEvent::ResolveEmpty, FetchState::Empty)
    }

    pub fn reject(&mut self, message: impl Into<String>) -> Result<()> {
        let message = message.into();
        warn!("Loading {} failed: {}", self.what, message);
        self.apply(FetchEvent::Reject, FetchState::Failed(message))
    }

    /// 回到初始状态
    pub fn reset(&mut self) {
        self.state = FetchState::Idle;
    }

    fn apply(&mut self, event: FetchEvent, next: FetchState<T>) -> Result<()> {
        let to = self.transitions.transition(self.state.phase(), event)?;
        debug!("{}: {:?} --{:?}--> {:?}", self.what, self.state.phase(), event, to);
        self.state = next;
        Ok(())
    }

    /// 执行一次读请求
    ///
    /// 请求错误转换为错误状态后返回 `Ok`；作用域被取消时返回
    /// `HmsError::Cancelled`，状态保持不变。
    pub async fn load<F>(&mut self, scope: &RequestScope, request: F) -> Result<()>
    where
        F: Future<Output = Result<T>>,
    {
        self.load_with(scope, request, |cycle, data| cycle.resolve(data))
            .await
    }

    async fn load_with<F, R>(
        &mut self,
        scope: &RequestScope,
        request: F,
        on_success: impl FnOnce(&mut Self, R) -> Result<()>,
    ) -> Result<()>
    where
        F: Future<Output = Result<R>>,
    {
        if scope.is_cancelled() {
            return Err(HmsError::Cancelled);
        }
        self.start()?;

        match scope.run(request).await {
            Ok(data) => on_success(self, data),
            Err(HmsError::Cancelled) => {
                debug!("Loading {} cancelled, state left untouched", self.what);
                Err(HmsError::Cancelled)
            }
            Err(e) => self.reject(e.user_message()),
        }
    }
}

impl<I> FetchCycle<Vec<I>> {
    /// 执行一次列表读请求，空列表进入 `Empty` 而不是错误状态
    pub async fn load_listing<F>(&mut self, scope: &RequestScope, request: F) -> Result<()>
    where
        F: Future<Output = Result<Listing<I>>>,
    {
        self.load_with(scope, request, |cycle, listing| match listing {
            Listing::Items(items) => cycle.resolve(items),
            Listing::Empty => cycle.resolve_empty(),
        })
        .await
    }
}
