//! Constants for the download module (chunking, resolution bounds, hosts).

/// Size of each write to the output file, in bytes.
pub const CHUNK_SIZE: usize = 1024;

/// Default maximum number of GET requests made while following
/// confirmation pages.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Host prefixed to relative `/uc?export=download` links.
pub const GOOGLE_DOCS_HOST: &str = "https://docs.google.com";
