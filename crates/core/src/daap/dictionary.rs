//! Tag dictionary for the DMAP/DAAP content codes this receiver understands.
//!
//! The full DMAP vocabulary has hundreds of codes and keeps growing. The
//! decoder only needs to know the ones it should surface; everything else
//! is skipped. The static table is built once on first use and is
//! read-only afterwards.

use std::collections::HashMap;
use std::sync::LazyLock;

/// How the content of a chunk is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// Content is itself a sequence of chunks.
    Container,
    U8,
    U16,
    U32,
    U64,
    I8,
    /// UTF-8 text, not NUL-terminated.
    Text,
    /// Opaque bytes.
    Blob,
}

impl TagKind {
    /// Exact content length required by fixed-width kinds.
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            TagKind::U8 | TagKind::I8 => Some(1),
            TagKind::U16 => Some(2),
            TagKind::U32 => Some(4),
            TagKind::U64 => Some(8),
            TagKind::Container | TagKind::Text | TagKind::Blob => None,
        }
    }
}

/// Dictionary entry: qualified name plus value kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagSpec {
    pub name: &'static str,
    pub kind: TagKind,
}

/// Lookup contract used by the decoder.
///
/// Implementations must be pure: the same tag always yields the same entry.
pub trait Dictionary {
    fn lookup(&self, tag: &[u8; 4]) -> Option<TagSpec>;
}

/// The built-in dictionary backed by [`CONTENT_CODES`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticDictionary;

impl Dictionary for StaticDictionary {
    fn lookup(&self, tag: &[u8; 4]) -> Option<TagSpec> {
        TABLE.get(tag).copied()
    }
}

impl<S: std::hash::BuildHasher> Dictionary for HashMap<[u8; 4], TagSpec, S> {
    fn lookup(&self, tag: &[u8; 4]) -> Option<TagSpec> {
        self.get(tag).copied()
    }
}

static TABLE: LazyLock<HashMap<[u8; 4], TagSpec>> = LazyLock::new(|| {
    CONTENT_CODES
        .iter()
        .map(|&(tag, name, kind)| (*tag, TagSpec { name, kind }))
        .collect()
});

/// Known content codes.
///
/// Listing containers are here so their children get flattened into the
/// record. Track fields are limited to what a receiver shows on screen.
pub const CONTENT_CODES: &[(&[u8; 4], &str, TagKind)] = &[
    // containers
    (b"mlit", "dmap.listingitem", TagKind::Container),
    (b"mlcl", "dmap.listing", TagKind::Container),
    (b"mcon", "dmap.container", TagKind::Container),
    (b"msrv", "dmap.serverinforesponse", TagKind::Container),
    (b"mccr", "dmap.contentcodesresponse", TagKind::Container),
    (b"mdcl", "dmap.dictionary", TagKind::Container),
    (b"mlog", "dmap.loginresponse", TagKind::Container),
    (b"mupd", "dmap.updateresponse", TagKind::Container),
    (b"avdb", "daap.serverdatabases", TagKind::Container),
    (b"adbs", "daap.databasesongs", TagKind::Container),
    (b"aply", "daap.databaseplaylists", TagKind::Container),
    (b"apso", "daap.playlistsongs", TagKind::Container),
    (b"cmst", "dmcp.playstatus", TagKind::Container),
    // track metadata
    (b"mikd", "dmap.itemkind", TagKind::U8),
    (b"minm", "dmap.itemname", TagKind::Text),
    (b"asal", "daap.songalbum", TagKind::Text),
    (b"asar", "daap.songartist", TagKind::Text),
    // status and bookkeeping
    (b"mstt", "dmap.status", TagKind::U32),
    (b"mlid", "dmap.sessionid", TagKind::U32),
    (b"musr", "dmap.serverrevision", TagKind::U32),
    (b"muty", "dmap.updatetype", TagKind::U8),
    (b"mtco", "dmap.specifiedtotalcount", TagKind::U32),
    (b"mrco", "dmap.returnedcount", TagKind::U32),
    (b"mimc", "dmap.itemcount", TagKind::U32),
    (b"mctc", "dmap.containercount", TagKind::U32),
    (b"mcnm", "dmap.contentcodesnumber", TagKind::U32),
    (b"mcna", "dmap.contentcodesname", TagKind::Text),
    (b"mcty", "dmap.contentcodestype", TagKind::U16),
    // remote control status
    (b"cmsr", "dmcp.serverrevision", TagKind::U32),
    (b"cmvo", "dmcp.volume", TagKind::U32),
    (b"cmpg", "dacp.pairingguid", TagKind::U64),
    (b"caps", "dacp.playerstate", TagKind::U8),
    (b"cash", "dacp.shufflestate", TagKind::U8),
    (b"carp", "dacp.repeatstate", TagKind::U8),
    (b"cant", "dacp.remainingtime", TagKind::U32),
    (b"cast", "dacp.tracklength", TagKind::U32),
    (b"canp", "dacp.nowplaying", TagKind::Blob),
    (b"cann", "daap.nowplayingtrack", TagKind::Text),
    (b"cana", "daap.nowplayingartist", TagKind::Text),
    (b"canl", "daap.nowplayingalbum", TagKind::Text),
    (b"cang", "daap.nowplayinggenre", TagKind::Text),
];
