//! # mathlens - solve math problems from photos
//!
//! Backend for an app that lets a user photograph a math problem, add a short
//! description and get a worked solution back. The service exposes a single
//! `POST /process` endpoint that:
//!
//! 1. **Receives** a multipart body with a `description` text field and an
//!    `image` file field ([`upload`]).
//! 2. **Stages** the image in a temp upload area and **encodes** it as base64
//!    with a media type resolved from its filename ([`encoder`], [`mime`]).
//! 3. **Solves** it with a generative model through the provider-agnostic
//!    [`Client`] trait; the shipped backend is Google Gemini
//!    ([`providers::Gemini`]).
//! 4. **Responds** with `{"result": ...}`, or a JSON error, after removing the
//!    staged file ([`server`]).
//!
//! ## Example
//! ```no_run
//! use mathlens::providers::{Gemini, Provider};
//! use mathlens::server::{build_router, AppState};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Gemini::create("your-api-key".to_string(), "gemini-1.5-flash".to_string());
//!     let state = AppState::new(client, std::env::temp_dir().join("mathlens-uploads"));
//!     let app = build_router(state, 20 * 1024 * 1024);
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod encoder;
pub mod error;
pub mod http;
pub mod mime;
pub mod model;
pub mod options;
pub mod providers;
pub mod server;
pub mod upload;

pub use client::{Client, ClientError};
pub use config::Config;
pub use error::AppError;
pub use model::{EncodedImage, SolverPrompt, SolverResult};
