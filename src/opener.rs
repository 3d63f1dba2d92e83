//! Open inputs and outputs by name, with `-` standing for the standard
//! streams.
//!
//! An empty name always means stdin/stdout. `-` does too unless
//! [`Opener::with_hyphen_as_file_name`] is set. Streams are buffered by
//! default; an output's buffer is flushed when its [`Closer`] is closed or
//! dropped.

use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::closer::Closer;
use crate::copy::MoveOptions;
use crate::error::Error;
use crate::platform::{Fs, Io, OpenOptions};
use crate::tempscope::TempScope;

pub type Input<'a> = Closer<'a, Box<dyn Read + 'a>>;
pub type Output<'a> = Closer<'a, Box<dyn Write + 'a>>;

#[derive(Debug)]
pub struct Opener<'a, F: Fs, I: Io> {
    fs: &'a F,
    io: &'a I,
    hyphen_is_file: bool,
    unbuffered: bool,
    move_options: MoveOptions,
}

impl<'a, F: Fs, I: Io> Opener<'a, F, I> {
    pub fn new(fs: &'a F, io: &'a I) -> Self {
        Self {
            fs,
            io,
            hyphen_is_file: false,
            unbuffered: false,
            move_options: MoveOptions::default(),
        }
    }

    pub fn with_hyphen_as_file_name(mut self, yes: bool) -> Self {
        self.hyphen_is_file = yes;
        self
    }

    pub fn with_unbuffered(mut self, yes: bool) -> Self {
        self.unbuffered = yes;
        self
    }

    /// How [`create_temp_file`](Self::create_temp_file) publishes its result.
    pub fn with_move_options(mut self, opts: MoveOptions) -> Self {
        self.move_options = opts;
        self
    }

    /// Whether `name` refers to a standard stream rather than a path.
    pub fn is_stdio(&self, name: &Path) -> bool {
        let name = name.as_os_str();
        name.is_empty() || (!self.hyphen_is_file && name == "-")
    }

    pub fn open(&self, name: &Path) -> Result<Input<'a>, Error> {
        self.open_file(name, &OpenOptions::new().read(true))
    }

    pub fn open_file(&self, name: &Path, opts: &OpenOptions) -> Result<Input<'a>, Error> {
        if self.is_stdio(name) {
            let io: &'a I = self.io;
            return Ok(Closer::nop(self.reader(io.stdin())));
        }
        let file = self.fs.open_file(name, opts).map_err(Error::io("open", name))?;
        Ok(Closer::nop(self.reader(file)))
    }

    pub fn create(&self, name: &Path) -> Result<Output<'a>, Error> {
        self.create_file(
            name,
            &OpenOptions::new().write(true).create(true).truncate(true),
        )
    }

    pub fn create_file(&self, name: &Path, opts: &OpenOptions) -> Result<Output<'a>, Error> {
        if self.is_stdio(name) {
            let io: &'a I = self.io;
            return Ok(self.writer(io.stdout()));
        }
        let file = self
            .fs
            .open_file(name, opts)
            .map_err(Error::io("create", name))?;
        Ok(self.writer(file))
    }

    pub fn temp_scope(&self) -> TempScope<'a, F> {
        TempScope::new(self.fs).with_move_options(self.move_options)
    }

    /// Run `handler` on an output for `final_name`.
    ///
    /// A standard-stream name is written straight through and the handler's
    /// verdict only reported. A path is staged in a temp file in `dir` and
    /// published only if the handler returns `Ok(true)`.
    pub fn create_temp_file<E, H>(
        &self,
        dir: &Path,
        prefix: &str,
        final_name: &Path,
        handler: H,
    ) -> Result<bool, E>
    where
        E: From<Error>,
        H: FnOnce(&mut dyn Write) -> Result<bool, E>,
    {
        if self.is_stdio(final_name) {
            let mut out = self.create(final_name)?;
            let accepted = handler(&mut out)?;
            out.close().map_err(Error::io("flush", final_name))?;
            return Ok(accepted);
        }

        let unbuffered = self.unbuffered;
        self.temp_scope()
            .temp_file_scope(dir, prefix, final_name, |file| {
                if unbuffered {
                    return handler(file);
                }
                let mut out = BufWriter::new(file);
                let accepted = handler(&mut out)?;
                out.flush().map_err(Error::io("flush", final_name))?;
                Ok(accepted)
            })
    }

    fn reader<R: Read + 'a>(&self, r: R) -> Box<dyn Read + 'a> {
        if self.unbuffered {
            Box::new(r)
        } else {
            Box::new(BufReader::new(r))
        }
    }

    fn writer<W: Write + 'a>(&self, w: W) -> Output<'a> {
        let inner: Box<dyn Write + 'a> = if self.unbuffered {
            Box::new(w)
        } else {
            Box::new(BufWriter::new(w))
        };
        Closer::new(inner, |w| w.flush())
    }
}
