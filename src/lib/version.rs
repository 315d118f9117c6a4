pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\n",
    env!("CARGO_PKG_DESCRIPTION"),
    "\nlicense: ",
    env!("CARGO_PKG_LICENSE"),
);
