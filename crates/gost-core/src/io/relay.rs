//! Bidirectional byte pump joining two streams.
//!
//! Both directions are driven as independent poll-based copies inside a
//! single future, so back-pressure on one direction never stalls the other.
//! The relay completes only when both directions have reached end-of-stream
//! (or an I/O error surfaces on either), and it never closes the streams it
//! was given: dropping them is the caller's responsibility.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::time::Instant;

/// Byte totals moved by a completed relay, one counter per direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transferred {
    /// Bytes copied from the first stream to the second.
    pub a_to_b: u64,
    /// Bytes copied from the second stream to the first.
    pub b_to_a: u64,
}

/// Sleep horizon used when no idle timeout is configured.
const IDLE_DISABLED: Duration = Duration::from_secs(365 * 86400);

enum PipeState {
    Reading,
    Writing { pos: usize, len: usize },
    Flushing { len: usize },
    ShuttingDown,
    Closed,
}

/// One copy direction: a transfer buffer plus its state machine.
struct Pipe {
    buf: Box<[u8]>,
    state: PipeState,
    total: u64,
}

enum PipeStep {
    /// A chunk was written and flushed; carries its size.
    Moved(usize),
    /// EOF reached and the write half shut down.
    Eof,
}

impl Pipe {
    fn new(buffer_size: usize) -> Self {
        Self {
            buf: vec![0u8; buffer_size].into_boxed_slice(),
            state: PipeState::Reading,
            total: 0,
        }
    }

    fn closed(&self) -> bool {
        matches!(self.state, PipeState::Closed)
    }

    /// Advance the read -> write -> flush cycle as far as readiness allows.
    fn poll_step<R, W>(
        &mut self,
        cx: &mut Context<'_>,
        reader: &mut R,
        writer: &mut W,
    ) -> Poll<io::Result<PipeStep>>
    where
        R: AsyncRead + Unpin + ?Sized,
        W: AsyncWrite + Unpin + ?Sized,
    {
        loop {
            match self.state {
                PipeState::Reading => {
                    let mut read_buf = ReadBuf::new(&mut self.buf);
                    match Pin::new(&mut *reader).poll_read(cx, &mut read_buf) {
                        Poll::Ready(Ok(())) => {
                            let n = read_buf.filled().len();
                            self.state = if n == 0 {
                                PipeState::ShuttingDown
                            } else {
                                PipeState::Writing { pos: 0, len: n }
                            };
                        }
                        Poll::Ready(Err(e)) => return Poll::Ready(Err(e)),
                        Poll::Pending => return Poll::Pending,
                    }
                }
                PipeState::Writing { pos, len } => {
                    match Pin::new(&mut *writer).poll_write(cx, &self.buf[pos..len]) {
                        Poll::Ready(Ok(n)) => {
                            let pos = pos + n;
                            self.state = if pos >= len {
                                PipeState::Flushing { len }
                            } else {
                                PipeState::Writing { pos, len }
                            };
                        }
                        Poll::Ready(Err(e)) => return Poll::Ready(Err(e)),
                        Poll::Pending => return Poll::Pending,
                    }
                }
                PipeState::Flushing { len } => {
                    match Pin::new(&mut *writer).poll_flush(cx) {
                        Poll::Ready(Ok(())) => {
                            self.state = PipeState::Reading;
                            self.total += len as u64;
                            return Poll::Ready(Ok(PipeStep::Moved(len)));
                        }
                        Poll::Ready(Err(e)) => return Poll::Ready(Err(e)),
                        Poll::Pending => return Poll::Pending,
                    }
                }
                PipeState::ShuttingDown => {
                    // Propagate the peer's EOF as a half-close so the other
                    // endpoint observes it and can wind down its own side.
                    match Pin::new(&mut *writer).poll_shutdown(cx) {
                        Poll::Ready(_) => {
                            self.state = PipeState::Closed;
                            return Poll::Ready(Ok(PipeStep::Eof));
                        }
                        Poll::Pending => return Poll::Pending,
                    }
                }
                PipeState::Closed => return Poll::Ready(Ok(PipeStep::Eof)),
            }
        }
    }
}

/// Pump bytes between `a` and `b` until both directions have ended.
///
/// Each direction uses a fixed transfer buffer of `buffer_size` bytes; the
/// relay never buffers beyond that. `idle_timeout` of zero disables the idle
/// guard; otherwise the relay returns once neither direction has moved data
/// within the window.
pub async fn relay<A, B>(
    a: A,
    b: B,
    idle_timeout: Duration,
    buffer_size: usize,
) -> io::Result<Transferred>
where
    A: AsyncRead + AsyncWrite + Unpin,
    B: AsyncRead + AsyncWrite + Unpin,
{
    let (mut a_read, mut a_write) = tokio::io::split(a);
    let (mut b_read, mut b_write) = tokio::io::split(b);

    let mut forward = Pipe::new(buffer_size);
    let mut backward = Pipe::new(buffer_size);

    let idle = if idle_timeout.is_zero() {
        IDLE_DISABLED
    } else {
        idle_timeout
    };
    let idle_sleep = tokio::time::sleep(idle);
    tokio::pin!(idle_sleep);

    loop {
        if forward.closed() && backward.closed() {
            return Ok(Transferred {
                a_to_b: forward.total,
                b_to_a: backward.total,
            });
        }

        // Poll both directions under one waker registration each, so either
        // can make progress while the other is blocked.
        let step = std::future::poll_fn(|cx| {
            let mut any_ready = false;
            let mut moved = false;
            let mut error: Option<io::Error> = None;

            if !forward.closed() {
                match forward.poll_step(cx, &mut a_read, &mut b_write) {
                    Poll::Ready(Ok(PipeStep::Moved(_))) => {
                        moved = true;
                        any_ready = true;
                    }
                    Poll::Ready(Ok(PipeStep::Eof)) => any_ready = true,
                    Poll::Ready(Err(e)) => {
                        error = Some(e);
                        any_ready = true;
                    }
                    Poll::Pending => {}
                }
            }

            if !backward.closed() {
                match backward.poll_step(cx, &mut b_read, &mut a_write) {
                    Poll::Ready(Ok(PipeStep::Moved(_))) => {
                        moved = true;
                        any_ready = true;
                    }
                    Poll::Ready(Ok(PipeStep::Eof)) => any_ready = true,
                    Poll::Ready(Err(e)) => {
                        error = Some(e);
                        any_ready = true;
                    }
                    Poll::Pending => {}
                }
            }

            if let Some(e) = error {
                return Poll::Ready(Err(e));
            }
            if any_ready {
                Poll::Ready(Ok(moved))
            } else {
                Poll::Pending
            }
        });

        tokio::select! {
            result = step => {
                if result? {
                    idle_sleep.as_mut().reset(Instant::now() + idle);
                }
            }
            _ = &mut idle_sleep => {
                return Ok(Transferred {
                    a_to_b: forward.total,
                    b_to_a: backward.total,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn relays_both_directions_to_completion() {
        let (client, near) = duplex(1024);
        let (far, target) = duplex(1024);

        let relay_handle =
            tokio::spawn(async move { relay(near, far, Duration::ZERO, 1024).await });

        let (mut client_r, mut client_w) = tokio::io::split(client);
        let (mut target_r, mut target_w) = tokio::io::split(target);

        client_w.write_all(b"hello").await.unwrap();
        drop(client_w);

        let mut buf = vec![0u8; 1024];
        let n = target_r.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"hello");

        target_w.write_all(b"world!").await.unwrap();
        drop(target_w);

        let n = client_r.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"world!");

        drop(client_r);
        drop(target_r);

        let moved = relay_handle.await.unwrap().unwrap();
        assert_eq!(moved.a_to_b, 5);
        assert_eq!(moved.b_to_a, 6);
    }

    #[tokio::test]
    async fn terminates_when_one_side_closes_mid_transfer() {
        let (client, near) = duplex(64);
        let (far, target) = duplex(64);

        let relay_handle =
            tokio::spawn(async move { relay(near, far, Duration::ZERO, 64).await });

        let (mut target_r, target_w) = tokio::io::split(target);
        let (_client_r, mut client_w) = tokio::io::split(client);

        client_w.write_all(b"partial").await.unwrap();
        let mut buf = vec![0u8; 64];
        let n = target_r.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"partial");

        // Both peers hang up; the relay must notice and return.
        drop(client_w);
        drop(_client_r);
        drop(target_w);
        drop(target_r);

        relay_handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn idle_timeout_unblocks_silent_peers() {
        let (_client, near) = duplex(64);
        let (far, _target) = duplex(64);

        let start = Instant::now();
        relay(near, far, Duration::from_millis(50), 64)
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn large_transfer_respects_fixed_buffer() {
        let (client, near) = duplex(256);
        let (far, target) = duplex(256);

        let relay_handle =
            tokio::spawn(async move { relay(near, far, Duration::ZERO, 128).await });

        let payload = vec![0xabu8; 64 * 1024];
        let expect = payload.clone();

        let (_client_r, mut client_w) = tokio::io::split(client);
        let (mut target_r, _target_w) = tokio::io::split(target);

        let writer = tokio::spawn(async move {
            client_w.write_all(&payload).await.unwrap();
            client_w.shutdown().await.unwrap();
        });

        let mut got = Vec::new();
        target_r.read_to_end(&mut got).await.unwrap();
        assert_eq!(got, expect);

        writer.await.unwrap();
        drop(_client_r);
        drop(target_r);
        drop(_target_w);
        let moved = relay_handle.await.unwrap().unwrap();
        assert_eq!(moved.a_to_b, 64 * 1024);
    }
}
