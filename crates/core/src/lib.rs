//! `govm-core`: the parts of the gateway that do not know about HTTP.
//!
//! - `config`: layered settings resolution (defaults, JSON file, environment)
//! - `bridge`: runs the external inventory tool and captures what it prints
//! - `inventory`: turns a captured listing into VM names
//! - `stream`: the streamed record type and the sink it is written through

pub mod bridge;
pub mod config;
pub mod error;
pub mod inventory;
pub mod stream;

pub use bridge::{CapturedInvocation, GovcTool, InvocationBridge, OutputChannel, Redirect, Tool};
pub use config::{GOVC_ENV_KEYS, Settings};
pub use error::{ErrorKind, GovmError, GovmResult};
pub use inventory::{VmName, list_vms, names_from_listing};
pub use stream::{RecordSink, StreamRecord, demo_sequence, emit, encode_record};
