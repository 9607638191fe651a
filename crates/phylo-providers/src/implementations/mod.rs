pub mod entrez;
pub mod galaxy;
pub mod local;
pub mod mock_provider;
pub mod process;
