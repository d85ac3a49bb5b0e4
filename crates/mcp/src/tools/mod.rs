pub mod bots;
pub mod calendars;
pub mod catalog;
pub mod echo;
pub mod events;
mod registry;

pub use catalog::{catalog, register_tools, register_tools_with_client};
pub use echo::EchoTool;
pub use registry::{
    check_range, check_uri, json_schema_boolean, json_schema_enum, json_schema_free_object,
    json_schema_integer, json_schema_object, json_schema_string, json_schema_uri,
    json_schema_uuid, nullable, parse_arguments, with_default, Tool, ToolArguments, ToolRegistry,
};
