//! Binary trajectory files
//!
//! A trajectory is a flat sequence of records, one per vector, each three
//! big-endian IEEE-754 doubles (x, y, z). There is no header; the record
//! count is the file length divided by 24.

use std::cell::RefCell;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::rc::Rc;

use thiserror::Error;

use crate::simulation::error::InvalidArgument;
use crate::simulation::vector::Vector3;

/// Bytes per record
pub const RECORD_LEN: usize = 3 * std::mem::size_of::<f64>();

#[derive(Debug, Error)]
pub enum TrajectoryError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("truncated record: {0} of 24 bytes")]
    Truncated(usize),

    #[error("record is not a valid vector: {0}")]
    Invalid(#[from] InvalidArgument),
}

pub struct TrajectoryWriter<W: Write> {
    out: W,
    written: usize,
}

impl TrajectoryWriter<BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> TrajectoryWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    pub fn write(&mut self, v: &Vector3) -> io::Result<()> {
        let mut record = [0u8; RECORD_LEN];
        for (chunk, c) in record.chunks_exact_mut(8).zip(v.to_array()) {
            chunk.copy_from_slice(&c.to_be_bytes());
        }
        self.out.write_all(&record)?;
        self.written += 1;
        Ok(())
    }

    /// Records written so far
    pub fn len(&self) -> usize {
        self.written
    }

    pub fn is_empty(&self) -> bool {
        self.written == 0
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Observer closure writing `pick(subject)` after every step
///
/// The writer is shared so the caller can flush it once the run is over.
pub fn recorder<P, W, F>(writer: Rc<RefCell<TrajectoryWriter<W>>>, pick: F) -> impl FnMut(&P) -> anyhow::Result<()>
where
    W: Write,
    F: Fn(&P) -> Vector3,
{
    move |subject: &P| {
        writer.borrow_mut().write(&pick(subject))?;
        Ok(())
    }
}

pub struct TrajectoryReader<R: Read> {
    input: R,
}

impl TrajectoryReader<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: Read> TrajectoryReader<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }

    /// Next record, or `None` at a clean end of input
    pub fn read(&mut self) -> Result<Option<Vector3>, TrajectoryError> {
        let mut record = [0u8; RECORD_LEN];
        let mut filled = 0;
        while filled < RECORD_LEN {
            match self.input.read(&mut record[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        match filled {
            0 => Ok(None),
            RECORD_LEN => {
                let mut c = [0.0; 3];
                for (value, chunk) in c.iter_mut().zip(record.chunks_exact(8)) {
                    let mut bytes = [0u8; 8];
                    bytes.copy_from_slice(chunk);
                    *value = f64::from_be_bytes(bytes);
                }
                Ok(Some(Vector3::try_from(c)?))
            }
            n => Err(TrajectoryError::Truncated(n)),
        }
    }
}

impl<R: Read> Iterator for TrajectoryReader<R> {
    type Item = Result<Vector3, TrajectoryError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read().transpose()
    }
}
