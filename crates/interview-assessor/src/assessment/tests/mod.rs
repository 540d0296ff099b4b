mod common;
mod synthesis;
