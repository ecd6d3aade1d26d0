pub mod asset_manage;
pub mod check;
pub mod extensions;
pub mod rename;
pub mod unify_ids;
pub mod unify_names;

pub use check::{BrokenReference, check_references};
pub use extensions::add_missing_extensions;
pub use rename::{rename, rename_file_name};
pub use unify_ids::{DuplicateId, IdRewrite, duplicate_ids, unify_ids};
pub use unify_names::unify_image_names;
