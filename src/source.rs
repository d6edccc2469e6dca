// SPDX-License-Identifier: LGPL-3.0-or-later OR MPL-2.0
// This file is a part of `glow-shader`.
//
// `glow-shader` is free software: you can redistribute it and/or modify it under the terms of
// either:
//
// * GNU Lesser General Public License as published by the Free Software Foundation, either
// version 3 of the License, or (at your option) any later version.
// * Mozilla Public License as published by the Mozilla Foundation, version 2.
//
// `glow-shader` is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Lesser General Public License or the Mozilla Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License and the Mozilla
// Public License along with `glow-shader`. If not, see <https://www.gnu.org/licenses/> or
// <https://www.mozilla.org/en-US/MPL/2.0/>.

//! Reading shader source text.

use crate::Error;

use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::Path;

/// Read an entire shader file into a string.
pub fn read_shader_file(path: impl AsRef<Path>) -> Result<String, Error> {
    let path = path.as_ref();

    if path.as_os_str().is_empty() {
        return Err(Error::Io {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "empty shader path"),
        });
    }

    let bytes = fs::read(path).map_err(|source| {
        tracing::error!("failed to open {}: {}", path.display(), source);
        Error::Io {
            path: path.to_path_buf(),
            source,
        }
    })?;

    tracing::trace!(path = %path.display(), len = bytes.len(), "read shader file");

    String::from_utf8(bytes).map_err(|_| Error::Encoding {
        path: path.to_path_buf(),
    })
}

/// Put a `#version` header in front of `source`.
///
/// Sources that already declare a `#version` before any other token are left alone, since
/// GLSL only allows it as the first statement; comments and whitespace may come first. A
/// leading byte order mark is always stripped.
pub fn prepare_source<'a>(source: &'a str, header: Option<&str>) -> Cow<'a, str> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);

    match header {
        Some(header) if !has_version_directive(source) => {
            Cow::Owned(format!("{header}\n{source}"))
        }
        _ => Cow::Borrowed(source),
    }
}

fn has_version_directive(source: &str) -> bool {
    skip_comments(source)
        .strip_prefix('#')
        .map_or(false, |rest| rest.trim_start().starts_with("version"))
}

/// Skip whitespace and `//` or `/* */` comments.
fn skip_comments(mut source: &str) -> &str {
    loop {
        source = source.trim_start();

        if let Some(rest) = source.strip_prefix("//") {
            source = rest.find('\n').map_or("", |end| &rest[end..]);
        } else if let Some(rest) = source.strip_prefix("/*") {
            match rest.find("*/") {
                Some(end) => source = &rest[end + 2..],
                None => return "",
            }
        } else {
            return source;
        }
    }
}
