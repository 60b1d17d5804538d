//! Pipe echo demo
//!
//! Starts an offloaded read on the read end of a pipe, writes a message
//! into the write end, and waits for the completion the worker delivers.

use fdio::{pipe, FixedBuffer, Result};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("fdio=debug")
        .init();

    let (reader, writer) = pipe()?;

    // The read runs on a dedicated worker thread; this thread never blocks
    // on it.
    let handle = reader.start_read(FixedBuffer::with_capacity(64), 12)?;
    println!("📥 Offloaded read started");

    let sent = writer.write_str("hello, pipe!")?;
    println!("📤 Wrote {sent} bytes");

    let completion = handle.wait()?;
    let n = completion.result?;
    println!(
        "✅ Completion: {n} bytes — {:?}",
        String::from_utf8_lossy(completion.buffer.as_slice())
    );

    // Synchronous path over the same descriptors.
    writer.write_str("and goodbye")?;
    let mut span = [0u8; 11];
    let n = reader.read(&mut span)?;
    println!("✅ Sync read: {:?}", String::from_utf8_lossy(&span[..n]));

    Ok(())
}
