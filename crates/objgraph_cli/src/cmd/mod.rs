/// Stream summary command.
pub mod info;
/// Frame tree command.
pub mod outline;
/// zstd envelope command.
pub mod pack;

mod util;

#[cfg(test)]
mod test_support;
