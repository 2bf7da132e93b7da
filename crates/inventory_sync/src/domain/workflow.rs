use crate::domain::InventorySnapshot;
use common::domain::{Device, DeviceInput, DomainError, DomainResult};
use common::garde::{ipv4_address, not_blank, validate};
use garde::Validate;

/// Device mutation workflow. Exactly one variant holds at any time; a target
/// device is carried only while editing or deleting it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WorkflowState {
    #[default]
    Idle,
    Creating,
    Editing(Device),
    Deleting(Device),
}

impl WorkflowState {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowState::Idle => "idle",
            WorkflowState::Creating => "creating",
            WorkflowState::Editing(_) => "editing",
            WorkflowState::Deleting(_) => "deleting",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, WorkflowState::Idle)
    }

    pub fn target(&self) -> Option<&Device> {
        match self {
            WorkflowState::Editing(device) | WorkflowState::Deleting(device) => Some(device),
            WorkflowState::Idle | WorkflowState::Creating => None,
        }
    }
}

/// Operator input for adding or editing a device
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct DeviceForm {
    #[garde(custom(not_blank))]
    pub name: String,
    #[garde(custom(ipv4_address))]
    pub ip_address: String,
    #[garde(skip)]
    pub mac_address: Option<String>,
    #[garde(required)]
    pub location_id: Option<i64>,
    #[garde(required)]
    pub device_type_id: Option<i64>,
}

impl DeviceForm {
    /// Form pre-filled from an existing device
    pub fn from_device(device: &Device) -> Self {
        Self {
            name: device.name.clone(),
            ip_address: device.ip_address.clone(),
            mac_address: device.mac_address.clone(),
            location_id: Some(device.location_id),
            device_type_id: Some(device.device_type_id),
        }
    }

    /// Validate the form and resolve its references against `snapshot`.
    /// A blank MAC address is sent as absent.
    pub fn to_input(&self, snapshot: &InventorySnapshot) -> DomainResult<DeviceInput> {
        validate(self)?;

        let (Some(location_id), Some(device_type_id)) = (self.location_id, self.device_type_id)
        else {
            return Err(DomainError::ValidationError(
                "location and device type are required".to_string(),
            ));
        };

        if snapshot.location(location_id).is_none() {
            return Err(DomainError::ValidationError(format!(
                "location_id: unknown location {}",
                location_id
            )));
        }
        if snapshot.device_type(device_type_id).is_none() {
            return Err(DomainError::ValidationError(format!(
                "device_type_id: unknown device type {}",
                device_type_id
            )));
        }

        let mac_address = self
            .mac_address
            .as_deref()
            .map(str::trim)
            .filter(|mac| !mac.is_empty())
            .map(str::to_string);

        Ok(DeviceInput {
            name: self.name.trim().to_string(),
            ip_address: self.ip_address.trim().to_string(),
            mac_address,
            location_id,
            device_type_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::domain::{DeviceType, Location};

    fn snapshot() -> InventorySnapshot {
        InventorySnapshot {
            devices: vec![],
            locations: vec![Location {
                id: 1,
                name: "Office".to_string(),
            }],
            device_types: vec![DeviceType {
                id: 2,
                name: "Printer".to_string(),
                icon_name: Some("printer".to_string()),
            }],
        }
    }

    fn form() -> DeviceForm {
        DeviceForm {
            name: "PR1".to_string(),
            ip_address: "192.168.1.10".to_string(),
            mac_address: None,
            location_id: Some(1),
            device_type_id: Some(2),
        }
    }

    #[test]
    fn test_valid_form_resolves() {
        let input = form().to_input(&snapshot()).unwrap();
        assert_eq!(input.name, "PR1");
        assert_eq!(input.ip_address, "192.168.1.10");
        assert_eq!(input.mac_address, None);
        assert_eq!(input.location_id, 1);
        assert_eq!(input.device_type_id, 2);
    }

    #[test]
    fn test_blank_mac_is_absent() {
        let input = DeviceForm {
            mac_address: Some("   ".to_string()),
            ..form()
        }
        .to_input(&snapshot())
        .unwrap();
        assert_eq!(input.mac_address, None);

        let input = DeviceForm {
            mac_address: Some(" AA:BB:CC:DD:EE:FF ".to_string()),
            ..form()
        }
        .to_input(&snapshot())
        .unwrap();
        assert_eq!(input.mac_address.as_deref(), Some("AA:BB:CC:DD:EE:FF"));
    }

    #[test]
    fn test_missing_fields_fail() {
        let result = DeviceForm {
            name: " ".to_string(),
            ..form()
        }
        .to_input(&snapshot());
        assert!(matches!(result, Err(DomainError::ValidationError(_))));

        let result = DeviceForm {
            location_id: None,
            ..form()
        }
        .to_input(&snapshot());
        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }

    #[test]
    fn test_bad_address_fails() {
        let result = DeviceForm {
            ip_address: "192.168.1.300".to_string(),
            ..form()
        }
        .to_input(&snapshot());
        match result {
            Err(DomainError::ValidationError(msg)) => assert!(msg.contains("ip_address")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_reference_fails() {
        let result = DeviceForm {
            device_type_id: Some(99),
            ..form()
        }
        .to_input(&snapshot());
        match result {
            Err(DomainError::ValidationError(msg)) => assert!(msg.contains("device type 99")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_device_prefills() {
        let device = Device {
            id: 5,
            name: "SRV".to_string(),
            ip_address: "10.0.0.5".to_string(),
            mac_address: Some("AA:BB:CC:DD:EE:FF".to_string()),
            location_id: 1,
            device_type_id: 2,
            location: None,
            device_type: None,
            scan_results: vec![],
        };

        let form = DeviceForm::from_device(&device);
        assert_eq!(form.name, "SRV");
        assert_eq!(form.location_id, Some(1));
        assert_eq!(form.to_input(&snapshot()).unwrap().mac_address, device.mac_address);
    }

    #[test]
    fn test_state_names_and_targets() {
        assert!(WorkflowState::default().is_idle());
        assert_eq!(WorkflowState::Creating.name(), "creating");
        assert!(WorkflowState::Creating.target().is_none());
    }
}
