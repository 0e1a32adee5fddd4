pub mod mock_upstream;
pub mod test_app;
