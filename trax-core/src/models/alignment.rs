/// One operation of a decoded alignment's CIGAR-like operation list.
///
/// The decoder (see `trax-coverage`'s BAM reading) maps the raw CIGAR
/// alphabet onto these kinds; the core never sees file bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlnOp {
    pub kind: AlnOpKind,
    pub len: u32,
}

impl AlnOp {
    pub fn new(kind: AlnOpKind, len: u32) -> Self {
        AlnOp { kind, len }
    }
}

/// Operation classes, grouped by how they move the reference pointer and
/// whether the touched positions receive coverage:
///
/// * [`AlnOpKind::Aligned`] and [`AlnOpKind::Deletion`] consume reference
///   and write.
/// * [`AlnOpKind::SoftClip`] consumes reference; it writes only when
///   [`WalkPolicy::count_soft_clip`] is set.
/// * [`AlnOpKind::Skip`] (intron) and [`AlnOpKind::HardClip`] consume
///   reference without writing.
/// * [`AlnOpKind::Insertion`] and [`AlnOpKind::Pad`] neither consume
///   reference nor write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlnOpKind {
    /// Match or mismatch (CIGAR M, =, X).
    Aligned,
    Insertion,
    Deletion,
    /// Intron / reference skip (CIGAR N).
    Skip,
    SoftClip,
    HardClip,
    Pad,
}

/// Options for the alignment walk.
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkPolicy {
    /// Count soft-clipped bases as covered instead of only stepping over them.
    pub count_soft_clip: bool,
}

/// Strand of a decoded record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strand {
    Forward,
    Reverse,
}

/// A decoded alignment, ready for accumulation or classification.
///
/// `start` is the 1-based unclipped start: the decoder subtracts leading
/// soft/hard clip lengths from the reported alignment start so that the walk
/// below lands clipped bases on their original reference positions.
#[derive(Debug, Clone)]
pub struct AlnRecord {
    pub name: String,
    pub chr: String,
    pub start: u32,
    pub ops: Vec<AlnOp>,
    pub strand: Strand,
    pub weight: f64,
}

/// Walk an operation list and return the reference positions it covers as
/// 1-based, half-open `(start, end)` blocks.
///
/// The running pointer starts at `start` and advances per the op classes on
/// [`AlnOpKind`]; there is no backtracking. Adjacent blocks are merged, so a
/// `5M 2I 3M` alignment yields one block (the insertion neither writes nor
/// advances) while `5M 10N 5M` yields two.
pub fn reference_blocks(start: u32, ops: &[AlnOp], policy: WalkPolicy) -> Vec<(u32, u32)> {
    let mut pos = start;
    let mut blocks: Vec<(u32, u32)> = Vec::new();

    for op in ops {
        if op.len == 0 {
            continue;
        }
        let writes = match op.kind {
            AlnOpKind::Aligned | AlnOpKind::Deletion => true,
            AlnOpKind::SoftClip => policy.count_soft_clip,
            AlnOpKind::Skip | AlnOpKind::HardClip => false,
            AlnOpKind::Insertion | AlnOpKind::Pad => {
                continue;
            }
        };

        let end = pos + op.len;
        if writes {
            match blocks.last_mut() {
                Some(last) if last.1 == pos => last.1 = end,
                _ => blocks.push((pos, end)),
            }
        }
        pos = end;
    }

    blocks
}
