pub mod environment;
pub mod paths;
pub mod terminal;

pub use environment::{default_projects_dir, resolve_projects_dir};
pub use paths::{
    DEFAULT_MAX_FILE_SIZE_BYTES, decode_path, encode_path, format_path_with_tilde,
    is_plausible_path, project_name, safe_open_file, validate_file_size,
    validate_path_not_symlink,
};
pub use terminal::{one_line, strip_ansi_codes};
