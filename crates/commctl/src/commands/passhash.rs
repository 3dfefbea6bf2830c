//! Local passhash generation.
//!
//! Runs without any network access; the resulting hash is pasted into
//! the service's administrator user store.

use std::fs;
use std::io::{Read, Write};

use tracing::debug;

use commctl_passhash::hash_password;

use crate::cli::PasshashArgs;
use crate::error::CliError;
use crate::output::{OutputFormat, PasshashOutput, render};

/// Executor for `commctl create passhash`.
pub struct PasshashCommand;

impl PasshashCommand {
    /// Hash the supplied password and render the result.
    ///
    /// # Errors
    ///
    /// Returns an error if no password source was given, the password
    /// file cannot be read, or the work factor is out of range.
    pub fn execute<W: Write, R: Read>(
        writer: &mut W,
        stdin: &mut R,
        format: &OutputFormat,
        args: &PasshashArgs,
    ) -> Result<(), CliError> {
        let plaintext = Self::resolve_plaintext(args, stdin)?;
        debug!(rounds = args.rounds, "hashing password");
        let hashed = hash_password(&plaintext, args.rounds)?;
        render(
            writer,
            format,
            &PasshashOutput {
                passhash: hashed.as_str().to_string(),
                cost: hashed.cost(),
            },
        )
    }

    fn resolve_plaintext<R: Read>(args: &PasshashArgs, stdin: &mut R) -> Result<String, CliError> {
        if let Some(plaintext) = &args.plaintext {
            return Ok(plaintext.clone());
        }
        let Some(path) = &args.file else {
            return Err(CliError::InvalidArgument(
                "a password or a password file ('-' for stdin) is required".to_string(),
            ));
        };
        let raw = if path.as_os_str() == "-" {
            let mut buf = String::new();
            stdin.read_to_string(&mut buf)?;
            buf
        } else {
            fs::read_to_string(path).map_err(|e| {
                CliError::InvalidArgument(format!(
                    "cannot read password file {}: {e}",
                    path.display()
                ))
            })?
        };
        // A trailing newline comes from the editor, not the password.
        Ok(raw.trim_end_matches(['\r', '\n']).to_string())
    }
}
