//! Advertising payload of the simulated device.

use crate::config::DeviceSettings;
use crate::gatt::uuids::{to_u16, CSC_SERVICE_UUID, CYCLING_POWER_SERVICE_UUID};
use crate::peripheral::types::DeviceConfiguration;

/// Legacy advertising PDUs carry at most 31 bytes of AD structures.
pub const MAX_ADVERTISING_DATA_LEN: usize = 31;

const AD_FLAGS: u8 = 0x01;
const AD_INCOMPLETE_16_BIT_UUIDS: u8 = 0x02;
const AD_SHORTENED_LOCAL_NAME: u8 = 0x08;
const AD_COMPLETE_LOCAL_NAME: u8 = 0x09;
const AD_APPEARANCE: u8 = 0x19;

/// LE General Discoverable, BR/EDR not supported.
const FLAGS_GENERAL_DISCOVERABLE: u8 = 0x06;

fn push_structure(data: &mut Vec<u8>, ad_type: u8, value: &[u8]) {
    data.push(value.len() as u8 + 1);
    data.push(ad_type);
    data.extend_from_slice(value);
}

/// Build the advertising data: flags, service UUIDs, appearance and name.
///
/// The name goes last and is shortened when the complete name would not fit.
pub fn advertising_data(device: &DeviceSettings) -> Vec<u8> {
    let mut data = Vec::with_capacity(MAX_ADVERTISING_DATA_LEN);

    push_structure(&mut data, AD_FLAGS, &[FLAGS_GENERAL_DISCOVERABLE]);

    let services: Vec<u8> = [CYCLING_POWER_SERVICE_UUID, CSC_SERVICE_UUID]
        .iter()
        .filter_map(to_u16)
        .flat_map(u16::to_le_bytes)
        .collect();
    push_structure(&mut data, AD_INCOMPLETE_16_BIT_UUIDS, &services);

    push_structure(&mut data, AD_APPEARANCE, &device.appearance.to_le_bytes());

    let room = MAX_ADVERTISING_DATA_LEN.saturating_sub(data.len() + 2);
    let name = device.name.as_bytes();
    if name.len() <= room {
        push_structure(&mut data, AD_COMPLETE_LOCAL_NAME, name);
    } else if room > 0 {
        let mut cut = room;
        while !device.name.is_char_boundary(cut) {
            cut -= 1;
        }
        push_structure(&mut data, AD_SHORTENED_LOCAL_NAME, &name[..cut]);
    }

    data
}

/// Device configuration handed to the peripheral stack.
pub fn device_configuration(device: &DeviceSettings) -> DeviceConfiguration {
    DeviceConfiguration {
        name: device.name.clone(),
        address: device.address.clone(),
        advertising_interval_min_ms: device.advertising_interval_min_ms,
        advertising_interval_max_ms: device.advertising_interval_max_ms,
        advertising_data: advertising_data(device),
    }
}
