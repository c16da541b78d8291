pub mod fs;
pub mod logging;
pub mod machine_output;
pub mod paths;
pub mod platform;
pub mod remote;
pub mod sanitize;
pub mod worker;
