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

//! Loading shader files from disk.

use glow_shader::{prepare_source, read_shader_file, Error, GlVersion, ShaderStage};

use std::error::Error as _;
use std::fs;
use std::io::ErrorKind;

fn init() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

const PREFILTER_FRAG: &str = "\
in vec3 vLocalPos;
out vec4 FragColor;

uniform samplerCube uEnvironmentMap;
uniform float uRoughness;

void main() {
    FragColor = vec4(texture(uEnvironmentMap, vLocalPos).rgb * uRoughness, 1.0);
}
";

#[test]
fn reads_whole_file() {
    init();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefilter.frag");
    fs::write(&path, PREFILTER_FRAG).unwrap();

    let source = read_shader_file(&path).unwrap();
    assert_eq!(source, PREFILTER_FRAG);
    assert_eq!(ShaderStage::from_path(&path), Some(ShaderStage::Fragment));
}

#[test]
fn reads_empty_file() {
    init();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.vert");
    fs::write(&path, "").unwrap();

    assert_eq!(read_shader_file(&path).unwrap(), "");
}

#[test]
fn missing_file() {
    init();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.vert");

    let err = read_shader_file(&path).unwrap_err();
    match &err {
        Error::Io { path: p, source } => {
            assert_eq!(p, &path);
            assert_eq!(source.kind(), ErrorKind::NotFound);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert!(err.source().is_some());
    assert!(err.to_string().contains("missing.vert"));
}

#[test]
fn binary_file_is_not_a_shader() {
    init();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbage.comp");
    fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();

    assert!(matches!(
        read_shader_file(&path),
        Err(Error::Encoding { path: ref p }) if p == &path
    ));
}

#[test]
fn loaded_source_gets_context_header() {
    init();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefilter.frag");
    fs::write(&path, PREFILTER_FRAG).unwrap();

    let source = read_shader_file(&path).unwrap();
    let header = GlVersion::Es { major: 3, minor: 2 }.default_header();
    let prepared = prepare_source(&source, header);

    assert!(prepared.starts_with("#version 300 es\n"));
    assert!(prepared.ends_with(PREFILTER_FRAG));

    // Preparing twice must not stack headers.
    assert_eq!(prepare_source(&prepared, header), prepared);
}
