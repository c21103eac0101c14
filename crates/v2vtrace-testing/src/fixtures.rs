//! Sample console logs.
//!
//! Each sample is shaped after real virt-v2v output, trimmed to the lines the parser cares about
//! plus enough noise to exercise classification.

use crate::builder::LogBuilder;

/// Three runs back to back: in-place conversion, inspection, customization.
pub fn three_tool_sequence() -> String {
    LogBuilder::new()
        .invocation("virt-v2v-in-place", "-v -x -i libvirtxml /tmp/guest.xml")
        .stage(0.0, "Setting up the source: -i libvirtxml /tmp/guest.xml")
        .stage(20.4, "Converting Windows Server 2019 Standard to run on KVM")
        .stage(95.1, "Finishing off")
        .invocation("virt-v2v-inspector", "-v -x -i disk /var/tmp/guest.img")
        .stage(0.0, "Setting up the source: -i disk /var/tmp/guest.img")
        .stage(8.2, "Finishing off")
        .invocation("virt-customize", "-a /var/tmp/guest.img --run-command 'echo hi'")
        .stage(0.0, "Examining the guest ...")
        .stage(3.0, "Finishing off")
        .build()
}

/// A virt-v2v run that failed during inspection.
pub const FAILED_CONVERSION: &str = r#"Building command: virt-v2v [-v -x -i vmx /data/vm/vm.vmx -o local -os /var/tmp]
virt-v2v: virt-v2v 2.4.0rhel=9,release=5.el9 (x86_64)
libvirt version: 9.0.0
[   0.0] Setting up the source: -i vmx /data/vm/vm.vmx
[   1.1] Opening the source
libguestfs: trace: v2v: get_backend_setting "force_tcg"
libguestfs: trace: v2v: get_backend_setting = NULL (error)
[  12.9] Inspecting the source
virt-v2v: error: inspection could not detect the source guest (or physical machine).
"#;

/// In-place conversion of a Windows guest: nbdkit input, hive edits, a generated firstboot script.
pub const WINDOWS_IN_PLACE: &str = r#"2024-05-02T09:14:01.120Z Building command: virt-v2v-in-place [-v -x -i libvirtxml /tmp/win.xml --root first]
2024-05-02T09:14:01.300Z virt-v2v-in-place: virt-v2v-in-place 2.4.0rhel=9,release=5.el9 (x86_64)
2024-05-02T09:14:01.310Z info: virt-v2v-in-place: starting conversion
2024-05-02T09:14:01.400Z [   0.0] Setting up the source: -i libvirtxml /tmp/win.xml
2024-05-02T09:14:02.000Z running nbdkit:
2024-05-02T09:14:02.000Z  LANG=C 'nbdkit' '--exit-with-parent' '--foreground' '--unix' '/tmp/v2v.Qa1/in0' '--threads' '16'
2024-05-02T09:14:02.000Z  '--filter' 'cacheextents' '--filter' 'retry' 'file' 'file=/var/lib/images/win.img'
2024-05-02T09:14:02.100Z nbdkit: debug: nbdkit 1.36.1 (nbdkit-1.36.1-1.el9)
2024-05-02T09:14:02.110Z nbdkit: debug: file: config key=file, value=/var/lib/images/win.img
2024-05-02T09:14:02.200Z nbdkit: file[1]: debug: file: get_size: size = 42949672960
2024-05-02T09:14:03.000Z [   1.6] Opening the source
2024-05-02T09:14:03.100Z libguestfs: trace: v2v: version
2024-05-02T09:14:03.110Z libguestfs: trace: v2v: version = <struct guestfs_version = major: 1, minor: 50, release: 1, extra: rhel=9,release=1.el9, >
2024-05-02T09:14:03.200Z libguestfs: trace: v2v: get_backend_setting "force_tcg"
2024-05-02T09:14:03.210Z libguestfs: trace: v2v: get_backend_setting = NULL (error)
2024-05-02T09:14:05.000Z [   4.5] Inspecting the source
2024-05-02T09:14:05.100Z libguestfs: trace: v2v: mount_ro "/dev/sda2" "/"
2024-05-02T09:14:05.110Z guestfsd: <= mount_ro (0x49) request length 64 bytes
2024-05-02T09:14:05.120Z commandrvf: stdout=n stderr=y flags=0x0
2024-05-02T09:14:05.130Z commandrvf: mount -o ro /dev/sda2 /sysroot/
2024-05-02T09:14:05.150Z guestfsd: => mount_ro (0x49) took 0.04 secs
2024-05-02T09:14:05.160Z libguestfs: trace: v2v: mount_ro = 0
2024-05-02T09:14:05.200Z fs: /dev/sda2 (ntfs) role: root
2024-05-02T09:14:05.200Z     product_name: Windows Server 2019 Standard
2024-05-02T09:14:05.200Z     type: windows
2024-05-02T09:14:05.200Z     distro: windows
2024-05-02T09:14:05.200Z     version: 10.0
2024-05-02T09:14:05.200Z     arch: x86_64
2024-05-02T09:14:05.200Z     hostname: WIN-DB01
2024-05-02T09:14:05.200Z     windows_systemroot: /Windows
2024-05-02T09:14:05.200Z     windows_current_control_set: ControlSet001
2024-05-02T09:14:05.200Z     drive_mappings: [("C", "/dev/sda2")]
2024-05-02T09:14:06.000Z [   5.0] Checking for sufficient free disk space in the guest
2024-05-02T09:14:07.000Z [   6.0] Converting Windows Server 2019 Standard to run on KVM
2024-05-02T09:14:07.100Z libguestfs: trace: v2v: hivex_open "/tmp/v2v.Qa1/software" "verbose:false"
2024-05-02T09:14:07.110Z libguestfs: trace: v2v: hivex_root
2024-05-02T09:14:07.120Z libguestfs: trace: v2v: hivex_root = 4096
2024-05-02T09:14:07.130Z libguestfs: trace: v2v: hivex_node_get_child 4096 "Microsoft"
2024-05-02T09:14:07.140Z libguestfs: trace: v2v: hivex_node_get_child = 8192
2024-05-02T09:14:07.150Z libguestfs: trace: v2v: hivex_node_get_child 8192 "Windows NT"
2024-05-02T09:14:07.160Z libguestfs: trace: v2v: hivex_node_get_child = 9216
2024-05-02T09:14:07.170Z libguestfs: trace: v2v: hivex_node_get_value 9216 "ProductName"
2024-05-02T09:14:07.180Z libguestfs: trace: v2v: hivex_node_get_value = 10240
2024-05-02T09:14:07.190Z libguestfs: trace: v2v: hivex_value_type = 1
2024-05-02T09:14:07.200Z libguestfs: trace: v2v: hivex_value_string = "Windows Server 2019 Standard"
2024-05-02T09:14:07.210Z libguestfs: trace: v2v: hivex_close
2024-05-02T09:14:07.300Z libguestfs: trace: v2v: hivex_open "/tmp/v2v.Qa1/system" "verbose:false" "write:true"
2024-05-02T09:14:07.310Z libguestfs: trace: v2v: hivex_root = 512
2024-05-02T09:14:07.320Z libguestfs: trace: v2v: hivex_node_get_child 512 "ControlSet001"
2024-05-02T09:14:07.330Z libguestfs: trace: v2v: hivex_node_get_child = 600
2024-05-02T09:14:07.340Z libguestfs: trace: v2v: hivex_node_get_child 600 "Services"
2024-05-02T09:14:07.350Z libguestfs: trace: v2v: hivex_node_get_child = 700
2024-05-02T09:14:07.360Z libguestfs: trace: v2v: hivex_node_add_child 700 "viostor"
2024-05-02T09:14:07.370Z libguestfs: trace: v2v: hivex_node_add_child = 800
2024-05-02T09:14:07.380Z libguestfs: trace: v2v: hivex_node_set_value 800 "Start" 4 "\x00\x00\x00\x00"
2024-05-02T09:14:07.390Z libguestfs: trace: v2v: hivex_commit NULL
2024-05-02T09:14:07.400Z libguestfs: trace: v2v: hivex_close
2024-05-02T09:14:08.000Z libguestfs: trace: v2v: write "/Program Files/Guestfs/Firstboot/scripts/0001-install-qemu-ga.bat" "@echo off\r\nmsiexec.exe /i qemu-ga-x86_64.msi /qn\r\n"
2024-05-02T09:14:08.100Z libguestfs: trace: v2v: write = 0
2024-05-02T09:14:08.500Z virt-v2v-in-place: warning: /usr/share/virt-tools/pnp_wait.exe is missing.  Firstboot scripts may conflict with PnP.
2024-05-02T09:14:09.000Z [   9.7] Mapping filesystem data to avoid copying unused and blank areas
2024-05-02T09:14:12.000Z [  12.4] Closing the overlay
2024-05-02T09:14:12.500Z [  12.9] Finishing off
"#;

/// Inspector output for an Amazon Linux guest whose version is only available through its CPE name.
pub const AMAZON_LINUX_INSPECTION: &str = r#"Building command: virt-v2v-inspector [-v -x -i disk /var/tmp/al2023.qcow2]
[   0.0] Setting up the source: -i disk /var/tmp/al2023.qcow2
[   2.3] Opening the source
[   6.1] Inspecting the source
i_root = /dev/nvme0n1p1
i_type = linux
i_distro = amzn
i_cpe = cpe:2.3:o:amazon:amazon_linux:2023:*:*:*:*:*:*:*
i_arch = x86_64
i_package_format = rpm
i_package_management = dnf
i_product_name = Amazon Linux 2023
i_mountpoints = [("/", "/dev/nvme0n1p1"), ("/boot/efi", "/dev/nvme0n1p128")]
i_apps = [
  [0] = {app2_name: kernel, app2_epoch: 0, app2_version: 6.1.61, app2_release: 85.141.amzn2023, app2_arch: x86_64}
  [1] = {app2_name: openssh-server, app2_epoch: 0, app2_version: 8.7p1, app2_release: 8.amzn2023.0.4, app2_arch: x86_64}
]
/dev/nvme0n1p1: LABEL="/" UUID="2f1c" BLOCK_SIZE="4096" TYPE="xfs" PARTLABEL="Linux"
/dev/nvme0n1p128: SEC_TYPE="msdos" UUID="A1B2" TYPE="vfat"
[   9.0] Finishing off
"#;
