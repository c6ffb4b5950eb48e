//! Async decoding over `tokio::io::AsyncRead`

use ldap_core::error::LdapResult;
use std::io::ErrorKind;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::container::{Asn1Container, ParseOutcome};
use crate::grammar::Decodable;

/// Decode one control value from an async reader
///
/// Same contract as `decode_from_read`: chunks of `read_buffer_size` bytes
/// are fed until the control completes, and end of stream before that is
/// `IncompleteGrammar`.
pub async fn decode_from_reader<T, R>(
    reader: &mut R,
    container: &mut Asn1Container<T>,
) -> LdapResult<T>
where
    T: Decodable,
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; container.config().read_buffer_size()];
    loop {
        let n = match reader.read(&mut buf).await {
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        log::debug!("{}: read {} bytes", container.grammar_name(), n);

        let outcome = if n == 0 {
            container.finish()
        } else {
            container.feed(&buf[..n])
        };
        match outcome {
            ParseOutcome::Complete(control) => return Ok(control),
            ParseOutcome::Failed(e) => return Err(e.into()),
            ParseOutcome::NeedMoreData => {}
        }
    }
}
