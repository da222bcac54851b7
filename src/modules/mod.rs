// src/modules/mod.rs

//! Concrete modules. Each one pairs an immutable config struct with a type
//! implementing [`crate::module::Module`].

pub mod application_process;
pub mod copy_directory;
pub mod copy_files;
pub mod file_list;
pub mod find_files;
pub mod read_lines;
pub mod regex_find_files;
pub mod results;
pub mod transfer_files;

pub use application_process::{ApplicationProcessConfig, ApplicationProcessModule};
pub use copy_directory::{
    CopyDirectoryConfig, CopyDirectoryModule, DirectoryTransferConfig, MoveDirectoryConfig,
    MoveDirectoryModule,
};
pub use copy_files::{
    CopyFilesConfig, CopyFilesModule, FileListTransferConfig, MoveFilesConfig, MoveFilesModule,
};
pub use file_list::{FileListConfig, FileListModule};
pub use find_files::{FindFilesConfig, FindFilesModule};
pub use read_lines::{ReadLinesConfig, ReadLinesModule, TextEncoding};
pub use regex_find_files::{RegexFindFilesConfig, RegexFindFilesModule};
pub use results::{FilePathResult, FilePathsResult, ProcessResult, ReadLinesResult};
pub use transfer_files::{TransferFilesConfig, TransferFilesModule};
