//! # courier-client
//!
//! Client side of Courier: a REST client that seals messages before they
//! leave the process, and [`ClientSync`], the background task that keeps a
//! local, decrypted view of the inbox.
//!
//! ```rust,no_run
//! use courier_client::{ClientSync, RestClient};
//! use courier_common::crypto::private_key_from_pem;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut rest = RestClient::new(None)?;
//!     rest.login("aaaa1111", "correct horse battery").await?;
//!     rest.send_message("bbbb2222", "hello").await?;
//!
//!     let key = private_key_from_pem(&std::fs::read_to_string("aaaa1111.pem")?)?;
//!     let sync = Arc::new(ClientSync::new(rest, key));
//!     let handle = sync.clone().spawn(courier_client::sync::DEFAULT_POLL_INTERVAL);
//!     // ...
//!     handle.stop().await;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod keyfile;
pub mod rest;
pub mod sync;

pub use error::{ClientError, Result};
pub use keyfile::save_private_key;
pub use rest::RestClient;
pub use sync::{ClientSync, MessageBody, MessageSource, ReceivedMessage, SyncHandle, SyncOutcome, SyncState};
