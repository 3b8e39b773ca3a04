use crate::auth::captcha::{CaptchaVerifier, TurnstileVerifier};
use crate::auth::repo::{FileUserStore, UserStore};
use crate::config::AppConfig;
use crate::storage::JsonFile;
use crate::todos::repo::{FileTodoStore, TodoStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub todos: Arc<dyn TodoStore>,
    pub captcha: Arc<dyn CaptchaVerifier>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let users = Arc::new(FileUserStore::new(JsonFile::new(&config.store.users_file)))
            as Arc<dyn UserStore>;
        let todos = Arc::new(FileTodoStore::new(JsonFile::new(&config.store.todos_file)))
            as Arc<dyn TodoStore>;
        let captcha = Arc::new(TurnstileVerifier::new(&config.captcha)?) as Arc<dyn CaptchaVerifier>;

        tracing::info!(
            users_file = %config.store.users_file,
            todos_file = %config.store.todos_file,
            "stores ready"
        );

        Ok(Self::from_parts(config, users, todos, captcha))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserStore>,
        todos: Arc<dyn TodoStore>,
        captcha: Arc<dyn CaptchaVerifier>,
    ) -> Self {
        Self {
            config,
            users,
            todos,
            captcha,
        }
    }

    /// In-memory stores and a CAPTCHA that accepts any non-empty token.
    #[cfg(test)]
    pub fn fake() -> Self {
        Self::fake_with_captcha(true)
    }

    #[cfg(test)]
    pub fn fake_with_captcha(passes: bool) -> Self {
        use crate::auth::captcha::StaticCaptcha;
        use crate::auth::repo::MemoryUserStore;
        use crate::config::{CaptchaConfig, JwtConfig, StoreConfig};
        use crate::todos::repo::MemoryTodoStore;

        let config = Arc::new(AppConfig {
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                ttl_hours: 72,
            },
            captcha: CaptchaConfig {
                secret: "test".into(),
                verify_url: "http://127.0.0.1:9/siteverify".into(),
                timeout_secs: 1,
            },
            store: StoreConfig {
                users_file: "unused-users.json".into(),
                todos_file: "unused-todos.json".into(),
            },
        });

        Self::from_parts(
            config,
            Arc::new(MemoryUserStore::default()),
            Arc::new(MemoryTodoStore::default()),
            Arc::new(StaticCaptcha(passes)),
        )
    }
}
