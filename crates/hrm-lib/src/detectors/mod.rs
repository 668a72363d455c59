pub mod qrs;
