#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Search,
    ImageUpload,
    Submission,
}

/// Identifies one in-flight request. Only the newest token of a kind is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken {
    kind: RequestKind,
    seq: u64,
}

#[derive(Debug)]
pub struct RequestSequencer {
    kind: RequestKind,
    latest: u64,
}

impl RequestSequencer {
    pub fn new(kind: RequestKind) -> Self {
        RequestSequencer { kind, latest: 0 }
    }

    /// Supersedes every token issued before.
    pub fn issue(&mut self) -> RequestToken {
        self.latest += 1;
        RequestToken {
            kind: self.kind,
            seq: self.latest,
        }
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        token.kind == self.kind && token.seq == self.latest
    }
}
