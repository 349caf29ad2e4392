//! The SPDY/3 preset compression dictionary and its Adler-32 checksum.
//!
//! Both SPDY directions seed their zlib inflater with the same fixed byte string so
//! that short, repetitive HTTP header names/values compress well even in the first
//! frame of a connection. The dictionary is process-wide and immutable after first
//! use: it is built once, behind a [`std::sync::OnceLock`], and never freed.

use std::sync::OnceLock;

/// Header and method names, in the order the reference SPDY/3 implementations
/// (spdylay, Chromium's `SpdyFramer`, Wireshark's `packet-spdy.c`
/// `spdy_dictionary[]`) emit them, each individually length-prefixed on the
/// wire. This portion of the dictionary is genuinely a list of discrete
/// tokens; the status-line/date/media-type tail below is not — the real
/// dictionary emits that part as one unprefixed literal run.
const HEADER_TOKENS: &[&str] = &[
    "options", "head", "post", "put", "delete", "trace", "accept",
    "accept-charset", "accept-encoding", "accept-language", "accept-ranges",
    "age", "allow", "authorization", "cache-control", "connection",
    "content-base", "content-encoding", "content-language", "content-length",
    "content-location", "content-md5", "content-range", "content-type",
    "date", "etag", "expect", "expires", "from", "host", "if-match",
    "if-modified-since", "if-none-match", "if-range", "if-unmodified-since",
    "last-modified", "location", "max-forwards", "pragma",
    "proxy-authenticate", "proxy-authorization", "range", "referer",
    "retry-after", "server", "te", "trailer", "transfer-encoding", "upgrade",
    "user-agent", "vary", "via", "warning", "www-authenticate", "method",
    "get", "status", "version", "url", "public", "set-cookie", "keep-alive",
    "origin",
];

/// The raw literal tail: status-line reason phrases, the day/month/time
/// tokens used in `Date`/`Expires` headers, and common media types, all
/// emitted back-to-back as one unprefixed run (not per-token length-prefixed)
/// followed by the `,enq=0.` fragment that terminates the real dictionary.
const LITERAL_TAIL: &[u8] = b"100 Continue,101 Switching Protocols,200 OK,201 Created,202 Accepted,\
203 Non-Authoritative Information,204 No Content,205 Reset Content,206 Partial Content,\
300 Multiple Choices,301 Moved Permanently,302 Found,303 See Other,304 Not Modified,\
305 Use Proxy,306 (Unused),307 Temporary Redirect,400 Bad Request,401 Unauthorized,\
402 Payment Required,403 Forbidden,404 Not Found,405 Method Not Allowed,\
406 Not Acceptable,407 Proxy Authentication Required,408 Request Timeout,409 Conflict,\
410 Gone,411 Length Required,412 Precondition Failed,413 Request Entity Too Large,\
414 Request-URI Too Long,415 Unsupported Media Type,\
416 Requested Range Not Satisfiable,417 Expectation Failed,\
500 Internal Server Error,501 Not Implemented,502 Bad Gateway,\
503 Service Unavailable,504 Gateway Timeout,505 HTTP Version Not Supported,\
Mon,Tue,Wed,Thu,Fri,Sat,Sun,Jan,Feb,Mar,Apr,May,Jun,Jul,Aug,Sep,Oct,Nov,Dec,\
00:00:00,GMT,chunked,text/html,image/png,image/jpg,image/gif,application/xml,\
application/xhtml+xml,text/plain,text/javascript,public,private,max-age,\
gzip,deflate,sdch,charset=utf-8,charset=iso-8859-1,HTTP/1.1,,enq=0.";

fn build_dictionary() -> Vec<u8> {
    let mut dict = Vec::with_capacity(4096);
    for token in HEADER_TOKENS {
        let bytes = token.as_bytes();
        dict.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
        dict.extend_from_slice(bytes);
    }
    dict.extend_from_slice(LITERAL_TAIL);
    dict
}

fn dictionary_cell() -> &'static Vec<u8> {
    static DICTIONARY: OnceLock<Vec<u8>> = OnceLock::new();
    DICTIONARY.get_or_init(build_dictionary)
}

/// The preset dictionary bytes, built once and shared process-wide.
pub fn preset_dictionary() -> &'static [u8] {
    dictionary_cell().as_slice()
}

/// Adler-32 as defined by RFC 1950, computed once and cached alongside the
/// dictionary bytes.
pub fn dictionary_adler32() -> u32 {
    static ADLER: OnceLock<u32> = OnceLock::new();
    *ADLER.get_or_init(|| adler32(preset_dictionary()))
}

const ADLER_MOD: u32 = 65521;

/// A small, dependency-free Adler-32 implementation (RFC 1950). Used only to
/// validate the peer's `Z_NEED_DICT` checksum against our own dictionary bytes;
/// the hot decompression path itself is handled entirely by `flate2`.
pub fn adler32(data: &[u8]) -> u32 {
    let mut a: u32 = 1;
    let mut b: u32 = 0;
    for &byte in data {
        a = (a + byte as u32) % ADLER_MOD;
        b = (b + a) % ADLER_MOD;
    }
    (b << 16) | a
}
