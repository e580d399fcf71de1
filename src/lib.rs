//! Issue OAuth 2.0 token requests against a Keycloak realm and get back the server's
//! payload, verbatim and strongly typed.
//!
//! ```no_run
//! # async fn run() -> keycloak_token_request::Result<()> {
//! use keycloak_token_request::{GrantRequest, request_token};
//!
//! let grant = GrantRequest::password("admin-cli", "admin", "admin");
//! let token = request_token("http://127.0.0.1:8080/auth", &grant).await?;
//!
//! println!("token type: {:?}", token.token_type());
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod endpoint;
pub mod error;
pub mod grant;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod requester;
pub mod token;

pub use error::{Error, Result};
pub use grant::{GrantRequest, GrantType};
#[cfg(feature = "reqwest")] pub use requester::{ReqwestTokenRequester, request_token};
pub use requester::TokenRequester;
pub use token::{ErrorResponse, TokenResponse};

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::Duration;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
