// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]

//! # avm1-decompiler
//!
//! Control flow recovery and decompilation of AVM1 bytecode, the stack based instruction set
//! of legacy Flash scripting, into an AS2-like syntax tree.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐   ┌───────────────┐   ┌──────────────────┐   ┌──────────────┐
//! │ ActionReader │──▶│  CfgBuilder   │──▶│  PassScheduler   │──▶│  lower_cfg   │
//! │ (actions at  │   │ (offsets to   │   │ constant pool    │   │ (CFG to AS2  │
//! │  offsets)    │   │  CFG arena)   │   │ expressionize    │   │  statements) │
//! └──────────────┘   └───────────────┘   │ reduce chains    │   └──────┬───────┘
//!                                        │ reduce if/else   │          │
//!                                        └──────────────────┘          ▼
//!                    ┌───────────────────────────────────────────────────────────┐
//!                    │ Tree transforms: builtin lowering, push/pop elimination,  │
//!                    │ unused constant pool removal, empty statement cleanup     │
//!                    └───────────────────────────────────────────────────────────┘
//! ```
//!
//! - [`action`] - Action model and the offset addressed [`action::ActionReader`] interface
//! - [`analysis`] - CFG arena, builder and the forward dataflow engine
//! - [`passes`] - Graph rewrites and their scheduler
//! - [`ast`] - The AS2 syntax tree
//! - [`decompiler`] - Per-action recipes, CFG lowering and the [`Decompiler`] facade
//! - [`tree`] - Indexed tree with traversal, replacement and scope discovery
//! - [`transform`] - Stack usage analysis and tree rewrites
//!
//! ## Quick Start
//!
//! ```rust
//! use avm1_decompiler::prelude::*;
//!
//! let actions = ActionList::new(vec![
//!     Action::ConstantPool { pool: vec!["x".to_string()] },
//!     Action::Push { values: vec![Value::Constant(0)] },
//!     Action::Trace,
//! ]);
//!
//! let script = Decompiler::default().decompile(&actions)?;
//! assert_eq!(script.body.len(), 1);
//! # Ok::<(), avm1_decompiler::Error>(())
//! ```
//!
//! ## Logging
//!
//! The library emits diagnostics through [`tracing`] and never installs a subscriber.
//! Pass changes are reported at `debug`, solver iterations at `trace`, and branch targets
//! outside the addressable range at `warn`.

#[macro_use]
pub(crate) mod error;

pub mod action;
pub mod analysis;
pub mod ast;
pub mod decompiler;
pub mod passes;
pub mod prelude;
pub mod transform;
pub mod tree;
pub mod utils;

pub use decompiler::{Decompiler, DecompilerConfig};
pub use error::Error;

/// The generic Result type of this library.
pub type Result<T> = std::result::Result<T, Error>;
