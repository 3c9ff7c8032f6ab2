mod harness;
mod mocks;
