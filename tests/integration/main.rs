//! Integration tests with a mock TTS server

mod batch;
mod gateway;
mod mock_server;
mod synthesis;
mod tool_surface;
