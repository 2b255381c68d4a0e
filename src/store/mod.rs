pub mod app;
pub mod tokens;

pub use app::{Action, AppState, AppStore, Modal, Notice, NoticeLevel, Route};
pub use tokens::{FileTokenStore, MemoryTokenStore, StoreError, StoredTokens, TokenStore};
