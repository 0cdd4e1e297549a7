//! 会话上下文
//!
//! 身份的唯一数据源。写入先落到持久化存储，再通过watch通道广播给订阅者，
//! 页头与页面始终看到同一个身份。

use crate::storage::SessionStorage;
use hms_core::{Identity, Result, Role};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// 持久化存储中使用的键
pub mod keys {
    pub const USER_ID: &str = "userId";
    pub const USER_NAME: &str = "userName";
    pub const USER_EMAIL: &str = "userEmail";
    pub const DOCTOR: &str = "doctor";
    pub const DOCTOR_ID: &str = "doctorId";

    pub const USER_KEYS: [&str; 3] = [USER_ID, USER_NAME, USER_EMAIL];
    pub const DOCTOR_KEYS: [&str; 2] = [DOCTOR, DOCTOR_ID];
    pub const ALL: [&str; 5] = [USER_ID, USER_NAME, USER_EMAIL, DOCTOR, DOCTOR_ID];
}

/// 会话上下文，克隆后共享同一状态
#[derive(Clone)]
pub struct SessionContext {
    storage: Arc<dyn SessionStorage>,
    sender: Arc<watch::Sender<Option<Identity>>>,
}

impl SessionContext {
    /// 从存储中恢复身份并创建上下文
    pub async fn load(storage: Arc<dyn SessionStorage>) -> Result<Self> {
        let identity = Self::read_identity(storage.as_ref()).await?;
        match &identity {
            Some(identity) => info!(
                "Restored {} session for id {}",
                identity.role, identity.id
            ),
            None => debug!("No stored session"),
        }

        let (sender, _) = watch::channel(identity);
        Ok(Self {
            storage,
            sender: Arc::new(sender),
        })
    }

    /// 当前身份
    pub fn identity(&self) -> Option<Identity> {
        self.sender.borrow().clone()
    }

    /// 指定角色的当前ID，角色不符时为空
    pub fn current_id(&self, role: Role) -> Option<u64> {
        self.sender
            .borrow()
            .as_ref()
            .filter(|identity| identity.role == role)
            .map(|identity| identity.id)
    }

    pub fn is_authenticated(&self) -> bool {
        self.sender.borrow().is_some()
    }

    /// 订阅身份变更
    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.sender.subscribe()
    }

    /// 持久化身份并广播；同时清除另一角色的键
    pub async fn set_identity(&self, identity: Identity) -> Result<()> {
        match identity.role {
            Role::User => {
                for key in keys::DOCTOR_KEYS {
                    self.storage.remove(key).await?;
                }
                self.storage.set(keys::USER_ID, &identity.id.to_string()).await?;
                self.storage.set(keys::USER_NAME, &identity.name).await?;
                self.storage.set(keys::USER_EMAIL, &identity.email).await?;
            }
            Role::Doctor => {
                for key in keys::USER_KEYS {
                    self.storage.remove(key).await?;
                }
                let record = serde_json::to_string(&identity)?;
                self.storage.set(keys::DOCTOR, &record).await?;
                self.storage
                    .set(keys::DOCTOR_ID, &identity.id.to_string())
                    .await?;
            }
        }

        info!("Session set for {} {}", identity.role, identity.id);
        self.sender.send_replace(Some(identity));
        Ok(())
    }

    /// 清除所有会话键并广播登出
    pub async fn clear_identity(&self) -> Result<()> {
        for key in keys::ALL {
            self.storage.remove(key).await?;
        }
        if let Some(previous) = self.sender.send_replace(None) {
            info!("Session cleared for {} {}", previous.role, previous.id);
        }
        Ok(())
    }

    // 医生身份优先；ID无法解析时视为未登录
    async fn read_identity(storage: &dyn SessionStorage) -> Result<Option<Identity>> {
        if let Some(raw_id) = storage.get(keys::DOCTOR_ID).await? {
            match raw_id.trim().parse::<u64>() {
                Ok(id) => {
                    let stored = storage
                        .get(keys::DOCTOR)
                        .await?
                        .and_then(|raw| serde_json::from_str::<Identity>(&raw).ok());
                    let identity = match stored {
                        Some(identity) => Identity {
                            id,
                            role: Role::Doctor,
                            ..identity
                        },
                        None => Identity {
                            id,
                            role: Role::Doctor,
                            name: String::new(),
                            email: String::new(),
                            specialization: None,
                        },
                    };
                    return Ok(Some(identity));
                }
                Err(_) => warn!("Ignoring malformed {}: {:?}", keys::DOCTOR_ID, raw_id),
            }
        }

        if let Some(raw_id) = storage.get(keys::USER_ID).await? {
            match raw_id.trim().parse::<u64>() {
                Ok(id) => {
                    return Ok(Some(Identity {
                        id,
                        role: Role::User,
                        name: storage.get(keys::USER_NAME).await?.unwrap_or_default(),
                        email: storage.get(keys::USER_EMAIL).await?.unwrap_or_default(),
                        specialization: None,
                    }))
                }
                Err(_) => warn!("Ignoring malformed {}: {:?}", keys::USER_ID, raw_id),
            }
        }

        Ok(None)
    }
}
