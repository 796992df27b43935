// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for NUT device monitoring.
//!
//! # Types
//!
//! - [`Value`] / [`ValueKind`] - Variable payloads typed by inference
//! - [`Variable`] / [`DeclaredType`] - A device variable and its server-declared type
//! - [`InstantCommand`] - An instant command a UPS supports
//! - [`Status`] / [`StatusCode`] - Decoded `ups.status` flags
//! - [`ServerErrorCode`] - The token of an `ERR` reply

mod server_error;
mod status;
mod value;
mod variable;

pub use server_error::ServerErrorCode;
pub use status::{Status, StatusCode, UnknownStatusCode};
pub use value::{Value, ValueKind};
pub use variable::{DeclaredType, InstantCommand, TypeInfo, Variable};
