use crate::consts::tlv::FreqBand;

impl_wire_enum!(
    /// Interface media type, "IEEE Std 1905.1-2013, Table 6-12".
    MediaType, u16,
    Ieee8023uFastEthernet => 0x0000,
    Ieee8023abGigabitEthernet => 0x0001,
    Ieee80211b2_4Ghz => 0x0100,
    Ieee80211g2_4Ghz => 0x0101,
    Ieee80211a5Ghz => 0x0102,
    Ieee80211n2_4Ghz => 0x0103,
    Ieee80211n5Ghz => 0x0104,
    Ieee80211ac5Ghz => 0x0105,
    Ieee80211ad60Ghz => 0x0106,
    Ieee80211af => 0x0107,
    Ieee1901Wavelet => 0x0200,
    Ieee1901Fft => 0x0201,
    MocaV1_1 => 0x0300,
    Unknown => 0xffff,
);

impl MediaType {
    /// True for every 802.11 variant.
    pub fn is_ieee80211(self) -> bool {
        matches!(
            self,
            MediaType::Ieee80211b2_4Ghz
                | MediaType::Ieee80211g2_4Ghz
                | MediaType::Ieee80211a5Ghz
                | MediaType::Ieee80211n2_4Ghz
                | MediaType::Ieee80211n5Ghz
                | MediaType::Ieee80211ac5Ghz
                | MediaType::Ieee80211ad60Ghz
                | MediaType::Ieee80211af
        )
    }

    /// True for the 1901 powerline variants.
    pub fn is_ieee1901(self) -> bool {
        matches!(self, MediaType::Ieee1901Wavelet | MediaType::Ieee1901Fft)
    }

    /// The autoconfiguration frequency band an 802.11 media type maps
    /// to, or `None` for non-802.11 media and 802.11af (which has no
    /// band assignment in the autoconfiguration tables).
    pub fn freq_band(self) -> Option<FreqBand> {
        match self {
            MediaType::Ieee80211b2_4Ghz
            | MediaType::Ieee80211g2_4Ghz
            | MediaType::Ieee80211n2_4Ghz => Some(FreqBand::Band2_4Ghz),
            MediaType::Ieee80211a5Ghz | MediaType::Ieee80211n5Ghz | MediaType::Ieee80211ac5Ghz => {
                Some(FreqBand::Band5Ghz)
            }
            MediaType::Ieee80211ad60Ghz => Some(FreqBand::Band60Ghz),
            _ => None,
        }
    }

    /// Number of media specific info bytes this media type carries in
    /// a device information TLV.
    pub fn media_specific_size(self) -> usize {
        if self.is_ieee80211() {
            10
        } else if self.is_ieee1901() {
            7
        } else {
            0
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_band_mapping() {
        assert_eq!(
            MediaType::Ieee80211g2_4Ghz.freq_band(),
            Some(FreqBand::Band2_4Ghz)
        );
        assert_eq!(
            MediaType::Ieee80211ac5Ghz.freq_band(),
            Some(FreqBand::Band5Ghz)
        );
        assert_eq!(
            MediaType::Ieee80211ad60Ghz.freq_band(),
            Some(FreqBand::Band60Ghz)
        );
        assert_eq!(MediaType::Ieee8023abGigabitEthernet.freq_band(), None);
        assert_eq!(MediaType::Ieee80211af.freq_band(), None);
    }

    #[test]
    fn test_media_specific_sizes() {
        assert_eq!(MediaType::Ieee80211n5Ghz.media_specific_size(), 10);
        assert_eq!(MediaType::Ieee1901Fft.media_specific_size(), 7);
        assert_eq!(MediaType::MocaV1_1.media_specific_size(), 0);
        assert_eq!(MediaType::Unknown.media_specific_size(), 0);
    }
}
