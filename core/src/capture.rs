//! Offline driving of a session, for recording the stream instead of playing it.

use crate::session::Session;

/// Upper bound on what `capture` reserves before rendering; past it the
/// buffer grows block by block.
const MAX_RESERVED_SAMPLES: u64 = 1 << 18;

fn initial_capacity(remaining: u64) -> usize {
    remaining.min(MAX_RESERVED_SAMPLES) as usize
}

/// Drive `session` to exhaustion one block at a time, handing each block's
/// rendered samples to `sink`, one slice per channel.
///
/// Blocks are `block_size` samples from the session's configuration; the
/// last one is cut to what was actually rendered. Returns the number of
/// sample frames delivered, or the first error the sink reports.
pub fn capture_blocks<E, F>(session: &mut Session, channels: usize, mut sink: F) -> Result<u64, E>
where
    F: FnMut(&[&[f32]]) -> Result<(), E>,
{
    let block_size = session.config().block_size;
    let mut buffers = vec![vec![0.0f32; block_size]; channels.max(1)];
    let mut delivered = 0u64;

    loop {
        let before = session.samples_rendered();
        let more = {
            let mut outputs: Vec<&mut [f32]> = buffers.iter_mut().map(|b| &mut b[..]).collect();
            session.render(&mut outputs)
        };
        let rendered = (session.samples_rendered() - before) as usize;

        if rendered > 0 {
            let block: Vec<&[f32]> = buffers.iter().map(|b| &b[..rendered]).collect();
            sink(&block)?;
            delivered += rendered as u64;
        }
        if !more {
            return Ok(delivered);
        }
    }
}

/// Render the remainder of a session into memory.
pub fn capture(session: &mut Session) -> Vec<f32> {
    let remaining = session
        .total_samples()
        .saturating_sub(session.samples_rendered());
    let mut samples = Vec::with_capacity(initial_capacity(remaining));

    let result: Result<u64, std::convert::Infallible> = capture_blocks(session, 1, |block| {
        samples.extend_from_slice(block[0]);
        Ok(())
    });
    if let Err(never) = result {
        match never {}
    }

    samples
}
