// インフラストラクチャ層モジュール
pub mod database_config;
pub mod logging;
pub mod provisioner;
pub mod sns_publisher;
pub mod transaction_store;

// 再エクスポート
pub use database_config::{DatabaseConfig, DatabaseConfigError, is_offline_mode};
pub use logging::init_logging;
pub use provisioner::{Provisioned, ProvisionError, acquire, ensure_table_exists};
pub use sns_publisher::{PublishError, SnsTransactionPublisher, TransactionPublisher};
pub use transaction_store::{PgTransactionStore, StoreError, TransactionStore};
