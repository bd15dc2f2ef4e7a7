//! Decoding a real track-metadata record captured from an AirPlay sender.

use raop::daap::{self, TagValue};
use raop::RaopError;

/// `mlit` listing item for one track, as sent in SET_PARAMETER
/// `application/x-dmap-tagged`. It carries over a hundred fields; the
/// receiver dictionary only knows four of them.
const TRACK_RECORD: &[u8] = &[
    0x6d, 0x6c, 0x69, 0x74, 0x00, 0x00, 0x06, 0x11, 0x6d, 0x69, 0x6b, 0x64, 0x00, 0x00, 0x00, 0x01,
    0x02, 0x61, 0x73, 0x61, 0x6c, 0x00, 0x00, 0x00, 0x0d, 0x50, 0x68, 0x61, 0x6e, 0x74, 0x6f, 0x6d,
    0x20, 0x50, 0x6f, 0x77, 0x65, 0x72, 0x61, 0x73, 0x61, 0x72, 0x00, 0x00, 0x00, 0x12, 0x54, 0x68,
    0x65, 0x20, 0x54, 0x72, 0x61, 0x67, 0x69, 0x63, 0x61, 0x6c, 0x6c, 0x79, 0x20, 0x48, 0x69, 0x70,
    0x61, 0x73, 0x62, 0x72, 0x00, 0x00, 0x00, 0x02, 0x01, 0x00, 0x61, 0x73, 0x63, 0x6d, 0x00, 0x00,
    0x00, 0x00, 0x61, 0x73, 0x63, 0x6f, 0x00, 0x00, 0x00, 0x01, 0x00, 0x61, 0x73, 0x63, 0x70, 0x00,
    0x00, 0x00, 0x55, 0x54, 0x68, 0x65, 0x20, 0x54, 0x72, 0x61, 0x67, 0x69, 0x63, 0x61, 0x6c, 0x6c,
    0x79, 0x20, 0x48, 0x69, 0x70, 0x2c, 0x20, 0x47, 0x6f, 0x72, 0x64, 0x20, 0x44, 0x6f, 0x77, 0x6e,
    0x69, 0x65, 0x2c, 0x20, 0x52, 0x6f, 0x62, 0x20, 0x42, 0x61, 0x6b, 0x65, 0x72, 0x2c, 0x20, 0x4a,
    0x6f, 0x68, 0x6e, 0x6e, 0x79, 0x20, 0x46, 0x61, 0x79, 0x2c, 0x20, 0x50, 0x61, 0x75, 0x6c, 0x20,
    0x4c, 0x61, 0x6e, 0x67, 0x6c, 0x6f, 0x69, 0x73, 0x20, 0x26, 0x20, 0x47, 0x6f, 0x72, 0x64, 0x20,
    0x53, 0x69, 0x6e, 0x63, 0x6c, 0x61, 0x69, 0x72, 0x6d, 0x65, 0x69, 0x61, 0x00, 0x00, 0x00, 0x04,
    0x5a, 0x9c, 0x15, 0xd3, 0x61, 0x73, 0x64, 0x61, 0x00, 0x00, 0x00, 0x04, 0x5a, 0x9c, 0x15, 0xd3,
    0x6d, 0x65, 0x69, 0x70, 0x00, 0x00, 0x00, 0x04, 0x83, 0xda, 0x87, 0xc0, 0x61, 0x73, 0x70, 0x6c,
    0x00, 0x00, 0x00, 0x04, 0x83, 0xda, 0x87, 0xc0, 0x61, 0x73, 0x64, 0x6d, 0x00, 0x00, 0x00, 0x04,
    0x5a, 0x9c, 0x61, 0x2a, 0x61, 0x73, 0x64, 0x63, 0x00, 0x00, 0x00, 0x02, 0x00, 0x01, 0x61, 0x73,
    0x64, 0x6e, 0x00, 0x00, 0x00, 0x02, 0x00, 0x01, 0x61, 0x73, 0x65, 0x71, 0x00, 0x00, 0x00, 0x00,
    0x61, 0x73, 0x67, 0x6e, 0x00, 0x00, 0x00, 0x03, 0x50, 0x6f, 0x70, 0x61, 0x73, 0x64, 0x74, 0x00,
    0x00, 0x00, 0x18, 0x50, 0x75, 0x72, 0x63, 0x68, 0x61, 0x73, 0x65, 0x64, 0x20, 0x41, 0x41, 0x43,
    0x20, 0x61, 0x75, 0x64, 0x69, 0x6f, 0x20, 0x66, 0x69, 0x6c, 0x65, 0x61, 0x73, 0x72, 0x76, 0x00,
    0x00, 0x00, 0x01, 0x00, 0x61, 0x73, 0x73, 0x72, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0xac, 0x44,
    0x61, 0x73, 0x73, 0x7a, 0x00, 0x00, 0x00, 0x04, 0x00, 0xa8, 0xf8, 0x0c, 0x61, 0x73, 0x73, 0x74,
    0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x61, 0x73, 0x73, 0x70, 0x00, 0x00, 0x00, 0x04,
    0x00, 0x00, 0x00, 0x00, 0x61, 0x73, 0x74, 0x6d, 0x00, 0x00, 0x00, 0x04, 0x00, 0x04, 0x81, 0xcd,
    0x61, 0x73, 0x74, 0x63, 0x00, 0x00, 0x00, 0x02, 0x00, 0x0c, 0x61, 0x73, 0x74, 0x6e, 0x00, 0x00,
    0x00, 0x02, 0x00, 0x04, 0x61, 0x73, 0x75, 0x72, 0x00, 0x00, 0x00, 0x01, 0x00, 0x61, 0x73, 0x79,
    0x72, 0x00, 0x00, 0x00, 0x02, 0x07, 0xce, 0x61, 0x73, 0x66, 0x6d, 0x00, 0x00, 0x00, 0x03, 0x6d,
    0x34, 0x61, 0x6d, 0x69, 0x69, 0x64, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0xc1, 0xa1, 0x6d, 0x69,
    0x6e, 0x6d, 0x00, 0x00, 0x00, 0x0a, 0x42, 0x6f, 0x62, 0x63, 0x61, 0x79, 0x67, 0x65, 0x6f, 0x6e,
    0x6d, 0x70, 0x65, 0x72, 0x00, 0x00, 0x00, 0x08, 0x36, 0xb2, 0x1c, 0xcf, 0xc9, 0xf5, 0x57, 0x4f,
    0x61, 0x73, 0x64, 0x62, 0x00, 0x00, 0x00, 0x01, 0x00, 0x61, 0x65, 0x4e, 0x56, 0x00, 0x00, 0x00,
    0x04, 0x00, 0x00, 0x0a, 0x3c, 0x61, 0x73, 0x64, 0x6b, 0x00, 0x00, 0x00, 0x01, 0x00, 0x61, 0x73,
    0x62, 0x74, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x61, 0x67, 0x72, 0x70, 0x00, 0x00, 0x00, 0x00,
    0x61, 0x65, 0x53, 0x49, 0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00, 0x3a, 0x32, 0xd3, 0xd2,
    0x61, 0x65, 0x41, 0x49, 0x00, 0x00, 0x00, 0x04, 0x00, 0x02, 0x71, 0x98, 0x61, 0x65, 0x50, 0x49,
    0x00, 0x00, 0x00, 0x04, 0x3a, 0x32, 0xd3, 0xce, 0x61, 0x65, 0x43, 0x49, 0x00, 0x00, 0x00, 0x04,
    0x01, 0xb5, 0xca, 0x36, 0x61, 0x65, 0x47, 0x49, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x0e,
    0x61, 0x73, 0x63, 0x64, 0x00, 0x00, 0x00, 0x04, 0x6d, 0x70, 0x34, 0x61, 0x61, 0x73, 0x63, 0x73,
    0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x02, 0x61, 0x65, 0x53, 0x46, 0x00, 0x00, 0x00, 0x04,
    0x00, 0x02, 0x30, 0x5f, 0x61, 0x65, 0x50, 0x43, 0x00, 0x00, 0x00, 0x01, 0x00, 0x61, 0x73, 0x63,
    0x74, 0x00, 0x00, 0x00, 0x00, 0x61, 0x73, 0x63, 0x6e, 0x00, 0x00, 0x00, 0x00, 0x61, 0x73, 0x63,
    0x72, 0x00, 0x00, 0x00, 0x01, 0x00, 0x61, 0x65, 0x48, 0x56, 0x00, 0x00, 0x00, 0x01, 0x00, 0x61,
    0x65, 0x4d, 0x4b, 0x00, 0x00, 0x00, 0x01, 0x01, 0x61, 0x65, 0x53, 0x4e, 0x00, 0x00, 0x00, 0x00,
    0x61, 0x65, 0x45, 0x4e, 0x00, 0x00, 0x00, 0x00, 0x61, 0x65, 0x45, 0x53, 0x00, 0x00, 0x00, 0x04,
    0x00, 0x00, 0x00, 0x00, 0x61, 0x65, 0x53, 0x55, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00,
    0x61, 0x65, 0x47, 0x48, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x01, 0x61, 0x65, 0x47, 0x44,
    0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x01, 0x14, 0x61, 0x65, 0x47, 0x55, 0x00, 0x00, 0x00, 0x08,
    0x00, 0x00, 0x00, 0x00, 0x00, 0xc6, 0xc2, 0xac, 0x61, 0x65, 0x47, 0x52, 0x00, 0x00, 0x00, 0x08,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x61, 0x65, 0x47, 0x45, 0x00, 0x00, 0x00, 0x04,
    0x00, 0x00, 0x08, 0x40, 0x61, 0x73, 0x61, 0x61, 0x00, 0x00, 0x00, 0x12, 0x54, 0x68, 0x65, 0x20,
    0x54, 0x72, 0x61, 0x67, 0x69, 0x63, 0x61, 0x6c, 0x6c, 0x79, 0x20, 0x48, 0x69, 0x70, 0x61, 0x73,
    0x67, 0x70, 0x00, 0x00, 0x00, 0x01, 0x00, 0x6d, 0x65, 0x78, 0x74, 0x00, 0x00, 0x00, 0x02, 0x00,
    0x01, 0x61, 0x73, 0x65, 0x64, 0x00, 0x00, 0x00, 0x02, 0x00, 0x01, 0x61, 0x73, 0x64, 0x72, 0x00,
    0x00, 0x00, 0x04, 0x35, 0xab, 0x01, 0xf0, 0x61, 0x73, 0x64, 0x70, 0x00, 0x00, 0x00, 0x04, 0x5a,
    0x9c, 0x5c, 0x23, 0x61, 0x73, 0x68, 0x70, 0x00, 0x00, 0x00, 0x01, 0x01, 0x61, 0x73, 0x73, 0x6e,
    0x00, 0x00, 0x00, 0x0a, 0x42, 0x6f, 0x62, 0x63, 0x61, 0x79, 0x67, 0x65, 0x6f, 0x6e, 0x61, 0x73,
    0x73, 0x61, 0x00, 0x00, 0x00, 0x0e, 0x54, 0x72, 0x61, 0x67, 0x69, 0x63, 0x61, 0x6c, 0x6c, 0x79,
    0x20, 0x48, 0x69, 0x70, 0x61, 0x73, 0x73, 0x6c, 0x00, 0x00, 0x00, 0x0e, 0x54, 0x72, 0x61, 0x67,
    0x69, 0x63, 0x61, 0x6c, 0x6c, 0x79, 0x20, 0x48, 0x69, 0x70, 0x61, 0x73, 0x73, 0x75, 0x00, 0x00,
    0x00, 0x0d, 0x50, 0x68, 0x61, 0x6e, 0x74, 0x6f, 0x6d, 0x20, 0x50, 0x6f, 0x77, 0x65, 0x72, 0x61,
    0x73, 0x73, 0x63, 0x00, 0x00, 0x00, 0x51, 0x54, 0x72, 0x61, 0x67, 0x69, 0x63, 0x61, 0x6c, 0x6c,
    0x79, 0x20, 0x48, 0x69, 0x70, 0x2c, 0x20, 0x47, 0x6f, 0x72, 0x64, 0x20, 0x44, 0x6f, 0x77, 0x6e,
    0x69, 0x65, 0x2c, 0x20, 0x52, 0x6f, 0x62, 0x20, 0x42, 0x61, 0x6b, 0x65, 0x72, 0x2c, 0x20, 0x4a,
    0x6f, 0x68, 0x6e, 0x6e, 0x79, 0x20, 0x46, 0x61, 0x79, 0x2c, 0x20, 0x50, 0x61, 0x75, 0x6c, 0x20,
    0x4c, 0x61, 0x6e, 0x67, 0x6c, 0x6f, 0x69, 0x73, 0x20, 0x26, 0x20, 0x47, 0x6f, 0x72, 0x64, 0x20,
    0x53, 0x69, 0x6e, 0x63, 0x6c, 0x61, 0x69, 0x72, 0x61, 0x73, 0x73, 0x73, 0x00, 0x00, 0x00, 0x00,
    0x61, 0x73, 0x62, 0x6b, 0x00, 0x00, 0x00, 0x01, 0x00, 0x61, 0x73, 0x70, 0x75, 0x00, 0x00, 0x00,
    0x00, 0x61, 0x65, 0x43, 0x52, 0x00, 0x00, 0x00, 0x00, 0x61, 0x73, 0x61, 0x69, 0x00, 0x00, 0x00,
    0x08, 0xd0, 0xcb, 0x3a, 0x18, 0xe2, 0x40, 0x98, 0xed, 0x61, 0x73, 0x6c, 0x73, 0x00, 0x00, 0x00,
    0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0xa8, 0xf8, 0x0c, 0x61, 0x65, 0x53, 0x45, 0x00, 0x00, 0x00,
    0x08, 0x00, 0x00, 0x00, 0x00, 0x01, 0xb6, 0x3a, 0xe5, 0x61, 0x65, 0x44, 0x56, 0x00, 0x00, 0x00,
    0x04, 0x00, 0x00, 0x00, 0x00, 0x61, 0x65, 0x44, 0x50, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00,
    0x00, 0x61, 0x65, 0x44, 0x52, 0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x61, 0x65, 0x4e, 0x44, 0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00, 0x0a, 0x51, 0xc2,
    0x2a, 0x61, 0x65, 0x4b, 0x31, 0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x61, 0x65, 0x4b, 0x32, 0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x61, 0x65, 0x44, 0x4c, 0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x61, 0x65, 0x46, 0x41, 0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x61, 0x65, 0x58, 0x44, 0x00, 0x00, 0x00, 0x1b, 0x55, 0x6e, 0x69, 0x76, 0x65, 0x72, 0x73,
    0x61, 0x6c, 0x3a, 0x69, 0x73, 0x72, 0x63, 0x3a, 0x43, 0x41, 0x4d, 0x31, 0x39, 0x39, 0x37, 0x30,
    0x30, 0x30, 0x37, 0x37, 0x61, 0x65, 0x4d, 0x6b, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x01,
    0x61, 0x65, 0x4d, 0x58, 0x00, 0x00, 0x00, 0x00, 0x61, 0x73, 0x70, 0x63, 0x00, 0x00, 0x00, 0x04,
    0x00, 0x00, 0x00, 0x00, 0x61, 0x73, 0x72, 0x69, 0x00, 0x00, 0x00, 0x08, 0xac, 0xea, 0x33, 0x83,
    0x0c, 0xe4, 0xfd, 0xdb, 0x61, 0x65, 0x43, 0x53, 0x00, 0x00, 0x00, 0x04, 0x00, 0x02, 0xc3, 0x8a,
    0x61, 0x73, 0x6b, 0x70, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x61, 0x73, 0x61, 0x63,
    0x00, 0x00, 0x00, 0x02, 0x00, 0x01, 0x61, 0x73, 0x6b, 0x64, 0x00, 0x00, 0x00, 0x04, 0x83, 0xda,
    0x87, 0xc0, 0x6d, 0x64, 0x73, 0x74, 0x00, 0x00, 0x00, 0x01, 0x01, 0x61, 0x73, 0x65, 0x73, 0x00,
    0x00, 0x00, 0x01, 0x00, 0x61, 0x65, 0x43, 0x64, 0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0xbf, 0x07,
    0xca, 0xd6, 0x9a, 0xe5, 0x61, 0x65, 0x43, 0x55, 0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00,
    0x0a, 0x51, 0xc2, 0x2a, 0x61, 0x73, 0x72, 0x73, 0x00, 0x00, 0x00, 0x01, 0x00, 0x61, 0x73, 0x6c,
    0x72, 0x00, 0x00, 0x00, 0x01, 0x00, 0x61, 0x73, 0x61, 0x73, 0x00, 0x00, 0x00, 0x01, 0x20, 0x61,
    0x65, 0x43, 0x46, 0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x61,
    0x65, 0x43, 0x4b, 0x00, 0x00, 0x00, 0x01, 0x02, 0x61, 0x65, 0x47, 0x73, 0x00, 0x00, 0x00, 0x01,
    0x01, 0x61, 0x65, 0x6c, 0x73, 0x00, 0x00, 0x00, 0x01, 0x00, 0x61, 0x6a, 0x61, 0x6c, 0x00, 0x00,
    0x00, 0x01, 0x00, 0x61, 0x6a, 0x63, 0x41, 0x00, 0x00, 0x00, 0x01, 0x00, 0x61, 0x77, 0x72, 0x6b,
    0x00, 0x00, 0x00, 0x00, 0x61, 0x6d, 0x76, 0x6d, 0x00, 0x00, 0x00, 0x00, 0x61, 0x6d, 0x76, 0x63,
    0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x61, 0x6d, 0x76, 0x6e, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00,
    0x61, 0x6a, 0x75, 0x77, 0x00, 0x00, 0x00, 0x01, 0x00,
];

#[test]
fn track_record_yields_four_fields() {
    let record = daap::decode(TRACK_RECORD).expect("decode track record");

    assert_eq!(record.len(), 4, "unexpected keys: {:?}", record.keys());
    assert_eq!(record["dmap.itemkind"], TagValue::U8(2));
    assert_eq!(record["dmap.itemname"].as_str(), Some("Bobcaygeon"));
    assert_eq!(record["daap.songalbum"].as_str(), Some("Phantom Power"));
    assert_eq!(record["daap.songartist"].as_str(), Some("The Tragically Hip"));
}

#[test]
fn truncated_track_record_is_out_of_bounds() {
    // Drop the last byte: the outer `mlit` now declares one byte too many.
    let truncated = &TRACK_RECORD[..TRACK_RECORD.len() - 1];
    assert!(matches!(
        daap::decode(truncated),
        Err(RaopError::OutOfBounds { .. })
    ));
}

#[test]
fn track_record_followed_by_siblings() {
    let mut buf = TRACK_RECORD.to_vec();
    buf.extend_from_slice(b"mstt");
    buf.extend_from_slice(&4u32.to_be_bytes());
    buf.extend_from_slice(&200u32.to_be_bytes());
    buf.extend_from_slice(b"minm");
    buf.extend_from_slice(&4u32.to_be_bytes());
    buf.extend_from_slice(b"Next");

    let record = daap::decode(&buf).unwrap();
    assert_eq!(record.len(), 5);
    assert_eq!(record["dmap.status"], TagValue::U32(200));
    assert_eq!(record["dmap.itemname"].as_str(), Some("Next"));
}
