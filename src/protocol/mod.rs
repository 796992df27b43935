// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Client side of the NUT network protocol.
//!
//! - [`ServerConfig`]: where a daemon lives and how to talk to it
//! - [`Session`]: one authenticated TCP connection with serialized exchanges
//! - [`NutCodec`] and [`read_response`]: line framing and reply delimiting
//!
//! All traffic to a daemon goes through one [`Session`], shared by every
//! device the daemon exposes.

mod codec;
mod config;
mod session;

pub use codec::{Framing, MAX_LINE_LENGTH, NutCodec, read_response};
pub use config::ServerConfig;
pub use session::Session;
