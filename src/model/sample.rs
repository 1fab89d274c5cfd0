/// Feature record for one grid cell, produced upstream and read-mostly afterwards.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub col: u32,
    pub row: u32,
    /// Offset of the sample in its source audio, in milliseconds.
    pub audio_start: u64,
    pub audio_dur: u64,
    pub hz: f64,
    pub clarity: f64,
    pub power: f64,
    pub embedding_x: f64,
    pub embedding_y: f64,
    /// Secondary ordering key used to sequence cluster members.
    pub sequencing_key: f64,
    #[serde(default)]
    pub derived: SampleDerived,
}

/// Optional fields attached to a [`Sample`] by composition stages.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleDerived {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
}

impl Sample {
    pub fn embedding(&self) -> [f64; 2] {
        [self.embedding_x, self.embedding_y]
    }

    pub fn grid_pos(&self) -> (u32, u32) {
        (self.col, self.row)
    }
}
