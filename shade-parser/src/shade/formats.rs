//! Output formats
//!
//!     Serializers for a parsed module, selected by name through the [`FormatRegistry`]:
//!
//!         - `json` / `yaml`: the structure data, loadable again (see [serialization]).
//!         - `treeviz`: a one-line-per-node outline (see [treeviz]).
//!         - `types`: the resolved type of every declaration (see [type_report]).

pub mod registry;
pub mod serialization;
pub mod treeviz;
pub mod type_report;

pub use registry::{FormatError, FormatRegistry, Formatter};
pub use serialization::{from_json, from_yaml, to_json, to_yaml, JsonFormatter, YamlFormatter};
pub use treeviz::{to_treeviz_str, to_treeviz_str_with_params, TreevizFormatter};
pub use type_report::{to_type_report, TypesFormatter};
