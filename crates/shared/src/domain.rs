use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }
    };
}

id_newtype!(ApplianceId);
id_newtype!(SignalId);

/// A pre-recorded transmission registered on an appliance. The payload itself
/// stays on the remote side; only the name is interpreted locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub id: SignalId,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appliance {
    pub id: ApplianceId,
    /// Display name shown in the remote app.
    pub nickname: String,
    #[serde(default)]
    pub signals: Vec<Signal>,
}

impl Appliance {
    pub fn find_signal(&self, name: &str) -> Option<&Signal> {
        self.signals.iter().find(|signal| signal.name == name)
    }
}

pub fn find_appliance<'a>(appliances: &'a [Appliance], nickname: &str) -> Option<&'a Appliance> {
    appliances
        .iter()
        .find(|appliance| appliance.nickname == nickname)
}
